// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;
use crate::common::error::ApiError; // Usamos o nosso ApiError para rejeição

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// O tenant (farmácia) que a requisição quer acessar.
// Só define o escopo das consultas; quem valida o acesso é a camada de dados (RLS).
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

fn bad_request(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        error: message.to_string(),
        details: None,
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_ID_HEADER)
            .ok_or_else(|| bad_request("O cabeçalho X-Tenant-ID é obrigatório."))?;

        let value_str = value
            .to_str()
            .map_err(|_| bad_request("Cabeçalho X-Tenant-ID contém caracteres inválidos."))?;

        let tenant_id = Uuid::parse_str(value_str.trim())
            .map_err(|_| bad_request("Cabeçalho X-Tenant-ID inválido (não é um UUID)."))?;

        Ok(TenantContext(tenant_id))
    }
}
