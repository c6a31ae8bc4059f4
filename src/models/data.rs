// src/models/data.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::common::error::AppError;

// Uma linha genérica devolvida pela camada de dados (objeto JSON)
pub type Row = Map<String, Value>;

// Filtros de igualdade: coluna -> valor
pub type Filters = Map<String, Value>;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub order_by: Option<OrderBy>,
    pub limit: Option<i64>,
    // Página começa em 1
    pub page: Option<i64>,
}

impl QueryOptions {
    /// Resolve `(limit, offset)`. Página sem limite usa o tamanho padrão.
    /// Página grande demais para o offset caber em i64 é erro do cliente.
    pub fn limit_offset(&self) -> Result<Option<(i64, i64)>, AppError> {
        match (self.limit, self.page) {
            (None, None) => Ok(None),
            (limit, page) => {
                let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
                let page = page.unwrap_or(1).max(1);
                let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
                    AppError::InvalidPayload(format!(
                        "Paginação inválida (page={}, limit={})",
                        page, limit
                    ))
                })?;
                Ok(Some((limit, offset)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MutationOperation {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    pub operation: MutationOperation,
    #[schema(example = "products")]
    pub table: String,
    #[schema(value_type = Object)]
    pub row: Row,
}
