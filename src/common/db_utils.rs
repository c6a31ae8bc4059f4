// src/common/db_utils.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper RLS: a "chave" do tenant para o banco
// ---
/// Define `app.tenant_id` na transação corrente, para as policies de RLS.
/// `is_local = true`: vale só até o commit, então SEMPRE chame dentro de uma transação.
pub(crate) async fn scope_to_tenant(
    conn: &mut PgConnection,
    tenant_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
        .bind(tenant_id.to_string())
        .execute(&mut *conn)
        .await?; // sqlx::Error -> AppError::DatabaseError

    Ok(())
}
