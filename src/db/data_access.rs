// src/db/data_access.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::data::{Filters, MutationOperation, MutationResult, QueryOptions, Row},
};

/// Leitura genérica por tabela, sempre no escopo de um tenant.
///
/// `columns` aceita uma lista separada por vírgula ou "*".
/// `filters` são filtros de igualdade (`coluna = valor`).
#[async_trait]
pub trait TenantDataAccess: Send + Sync {
    async fn query(
        &self,
        tenant_id: Uuid,
        table: &str,
        columns: &str,
        filters: &Filters,
        options: &QueryOptions,
    ) -> Result<Vec<Row>, AppError>;
}

/// Escrita genérica por tabela (insert / update / delete), no escopo de um tenant.
///
/// Para update e delete o payload precisa carregar o `id`.
#[async_trait]
pub trait MutationService: Send + Sync {
    async fn mutate(
        &self,
        tenant_id: Uuid,
        table: &str,
        operation: MutationOperation,
        payload: Row,
    ) -> Result<MutationResult, AppError>;
}
