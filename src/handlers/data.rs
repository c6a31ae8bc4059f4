// src/handlers/data.rs
//
// Rotas genéricas usadas pelas telas de cadastro (famílias, DCI, preços...).
// Tudo passa pelo registro de tabelas; nada de SQL vindo do cliente.

use std::collections::HashMap;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::data::{
        Filters, MutationOperation, MutationResult, OrderBy, QueryOptions, Row, SortDirection,
        MAX_PAGE_SIZE,
    },
};

// Parâmetros reservados; o resto da query string vira filtro de igualdade
const RESERVED_PARAMS: &[&str] = &["columns", "orderBy", "order", "limit", "page"];

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DataQueryParams {
    #[param(example = "id,name")]
    pub columns: Option<String>,
    #[param(example = "name")]
    pub order_by: Option<String>,
    pub order: Option<SortDirection>,
    #[validate(range(min = 1, max = MAX_PAGE_SIZE, message = "O limite deve estar entre 1 e 1000."))]
    pub limit: Option<i64>,
    #[validate(range(min = 1, message = "A página começa em 1."))]
    pub page: Option<i64>,
}

impl DataQueryParams {
    fn options(&self) -> QueryOptions {
        QueryOptions {
            order_by: self.order_by.as_ref().map(|column| OrderBy {
                column: column.clone(),
                direction: self.order.unwrap_or_default(),
            }),
            limit: self.limit,
            page: self.page,
        }
    }
}

fn filters_from(raw: HashMap<String, String>) -> Filters {
    raw.into_iter()
        .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

// GET /api/data/{table}
#[utoipa::path(
    get,
    path = "/api/data/{table}",
    tag = "Data",
    params(
        ("table" = String, Path, description = "Tabela do registro (ex: products)"),
        DataQueryParams,
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Linhas da tabela no escopo do tenant", body = Vec<serde_json::Value>),
        (status = 400, description = "Tabela, coluna ou paginação inválida")
    )
)]
pub async fn query_table(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(table): Path<String>,
    params: Result<Query<DataQueryParams>, QueryRejection>,
    raw: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Query(params) = params.map_err(AppError::from)?;
    let Query(raw) = raw.map_err(AppError::from)?;
    params.validate().map_err(AppError::ValidationError)?;

    let rows = app_state
        .data_access
        .query(
            tenant.0,
            &table,
            params.columns.as_deref().unwrap_or("*"),
            &filters_from(raw),
            &params.options(),
        )
        .await?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/data/{table}
#[utoipa::path(
    post,
    path = "/api/data/{table}",
    tag = "Data",
    request_body(content = serde_json::Value, description = "Colunas a gravar"),
    params(
        ("table" = String, Path, description = "Tabela do registro"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 201, description = "Linha criada", body = MutationResult),
        (status = 405, description = "Tabela somente leitura")
    )
)]
pub async fn insert_row(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(table): Path<String>,
    Json(payload): Json<Row>,
) -> Result<impl IntoResponse, ApiError> {

    let result = app_state
        .mutations
        .mutate(tenant.0, &table, MutationOperation::Insert, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

// PATCH /api/data/{table}/{id}
#[utoipa::path(
    patch,
    path = "/api/data/{table}/{id}",
    tag = "Data",
    request_body(content = serde_json::Value, description = "Colunas a alterar"),
    params(
        ("table" = String, Path, description = "Tabela do registro"),
        ("id" = Uuid, Path, description = "ID da linha"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Linha atualizada", body = MutationResult),
        (status = 404, description = "Linha não encontrada")
    )
)]
pub async fn update_row(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path((table, id)): Path<(String, Uuid)>,
    Json(mut payload): Json<Row>,
) -> Result<impl IntoResponse, ApiError> {

    // O id da rota sempre vence o do corpo
    payload.insert("id".into(), Value::String(id.to_string()));

    let result = app_state
        .mutations
        .mutate(tenant.0, &table, MutationOperation::Update, payload)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// DELETE /api/data/{table}/{id}
#[utoipa::path(
    delete,
    path = "/api/data/{table}/{id}",
    tag = "Data",
    params(
        ("table" = String, Path, description = "Tabela do registro"),
        ("id" = Uuid, Path, description = "ID da linha"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Linha removida", body = MutationResult),
        (status = 404, description = "Linha não encontrada")
    )
)]
pub async fn delete_row(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path((table, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {

    let mut payload = Row::new();
    payload.insert("id".into(), Value::String(id.to_string()));

    let result = app_state
        .mutations
        .mutate(tenant.0, &table, MutationOperation::Delete, payload)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}
