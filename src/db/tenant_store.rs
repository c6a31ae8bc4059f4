// src/db/tenant_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::scope_to_tenant, error::AppError},
    db::{
        data_access::{MutationService, TenantDataAccess},
        sql_builder::{self, BuiltQuery},
        table_registry::{self, PreparedMutation},
    },
    models::data::{Filters, MutationOperation, MutationResult, QueryOptions, Row},
};

// Implementação Postgres da camada genérica de dados.
// Cada chamada roda numa transação curta com o `app.tenant_id` definido (RLS).
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run(
        &self,
        tenant_id: Uuid,
        built: &BuiltQuery,
        id: Option<Uuid>,
    ) -> Result<Vec<Value>, AppError> {
        let mut tx = self.pool.begin().await?;
        scope_to_tenant(&mut tx, tenant_id).await?;

        let mut query = sqlx::query_scalar::<_, Json<Value>>(&built.sql).bind(tenant_id);
        if built.uses_id_param {
            query = query.bind(id);
        }
        for param in &built.json_params {
            query = query.bind(Json(param.clone()));
        }

        let rows = query.fetch_all(&mut *tx).await.map_err(map_constraint_error)?;

        tx.commit().await?;
        Ok(rows.into_iter().map(|Json(value)| value).collect())
    }
}

// Violações de constraint são erro do cliente, não do servidor
fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::InvalidPayload(format!(
                "Registro duplicado ({})",
                db_err.constraint().unwrap_or_default()
            ));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidPayload(format!(
                "Referência inexistente ({})",
                db_err.constraint().unwrap_or_default()
            ));
        }
        if db_err.is_check_violation() {
            return AppError::InvalidPayload(format!(
                "Valor fora das regras da tabela ({})",
                db_err.constraint().unwrap_or_default()
            ));
        }
    }
    e.into()
}

fn into_row(table: &str, value: Value) -> Result<Row, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidRow {
            table: table.to_string(),
            reason: format!("esperado um objeto JSON, recebido {}", other),
        }),
    }
}

#[async_trait]
impl TenantDataAccess for PgTenantStore {
    async fn query(
        &self,
        tenant_id: Uuid,
        table: &str,
        columns: &str,
        filters: &Filters,
        options: &QueryOptions,
    ) -> Result<Vec<Row>, AppError> {
        let spec = table_registry::lookup(table)?;
        let built = sql_builder::build_select(spec, columns, filters, options)?;

        tracing::debug!(%tenant_id, table, sql = %built.sql, "consulta genérica");

        self.run(tenant_id, &built, None)
            .await?
            .into_iter()
            .map(|value| into_row(table, value))
            .collect()
    }
}

#[async_trait]
impl MutationService for PgTenantStore {
    async fn mutate(
        &self,
        tenant_id: Uuid,
        table: &str,
        operation: MutationOperation,
        payload: Row,
    ) -> Result<MutationResult, AppError> {
        let spec = table_registry::lookup(table)?;
        let prepared: PreparedMutation = spec.prepare(operation, payload)?;

        let built = match operation {
            MutationOperation::Insert => sql_builder::build_insert(spec, &prepared),
            MutationOperation::Update => sql_builder::build_update(spec, &prepared),
            MutationOperation::Delete => sql_builder::build_delete(spec),
        };

        let mut rows = self.run(tenant_id, &built, prepared.id).await?;

        let Some(value) = rows.pop() else {
            return Err(AppError::RowNotFound {
                table: table.to_string(),
                id: prepared.id.map(|id| id.to_string()).unwrap_or_default(),
            });
        };

        tracing::info!(%tenant_id, table, ?operation, "✅ Mutação aplicada");

        Ok(MutationResult {
            operation,
            table: table.to_string(),
            row: into_row(table, value)?,
        })
    }
}

// Rodam contra um Postgres real (DATABASE_URL); `cargo test -- --ignored`.
// O sqlx::test cria um banco temporário e aplica as migrações.
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn insert(store: &PgTenantStore, tenant: Uuid, table: &str, value: Value) -> Row {
        store
            .mutate(tenant, table, MutationOperation::Insert, payload(value))
            .await
            .unwrap()
            .row
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn crud_runs_against_postgres(pool: PgPool) {
        let store = PgTenantStore::new(pool);
        let tenant = Uuid::new_v4();

        let created = insert(&store, tenant, "dci", json!({ "name": "Paracétamol", "atc_code": "N02BE01" })).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["tenant_id"], tenant.to_string());

        let updated = store
            .mutate(
                tenant,
                "dci",
                MutationOperation::Update,
                payload(json!({ "id": id, "atc_code": "N02BE51" })),
            )
            .await
            .unwrap();
        assert_eq!(updated.row["atc_code"], "N02BE51");

        // Filtro texto contra coluna uuid
        let mut filters = Filters::new();
        filters.insert("id".into(), Value::String(id.clone()));
        let rows = store
            .query(tenant, "dci", "id,atc_code", &filters, &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["atc_code"], "N02BE51");

        // Outro tenant não enxerga a linha
        let other = store
            .query(Uuid::new_v4(), "dci", "*", &Filters::new(), &QueryOptions::default())
            .await
            .unwrap();
        assert!(other.is_empty());

        store
            .mutate(tenant, "dci", MutationOperation::Delete, payload(json!({ "id": id })))
            .await
            .unwrap();
        let err = store
            .mutate(tenant, "dci", MutationOperation::Delete, payload(json!({ "id": id })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RowNotFound { .. }));
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn stock_movement_trigger_feeds_valuation(pool: PgPool) {
        let store = PgTenantStore::new(pool);
        let tenant = Uuid::new_v4();

        let product = insert(&store, tenant, "products", json!({ "name": "Doliprane", "unit_cost": 2.5 })).await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let movement = insert(
            &store,
            tenant,
            "stock_movements",
            json!({
                "product_id": product_id,
                "movement_type": "ENTRY",
                "quantity": 10,
                "metadata": { "type": "ENTRY", "batchNumber": "L42" }
            }),
        )
        .await;
        assert_eq!(movement["quantity_before"], 0);
        assert_eq!(movement["quantity_after"], 10);

        // Saída maior que o saldo viola a regra do trigger
        let err = store
            .mutate(
                tenant,
                "stock_movements",
                MutationOperation::Insert,
                payload(json!({ "product_id": product_id, "movement_type": "EXIT", "quantity": 11 })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidPayload(_)));

        let rows = store
            .query(tenant, "stock_valuation", "id,quantity_on_hand,unit_cost,trend", &Filters::new(), &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["quantity_on_hand"], 10);
        assert_eq!(rows[0]["trend"], "up");
    }
}
