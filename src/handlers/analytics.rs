// src/handlers/analytics.rs

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid; // Importante para o Swagger params
use validator::{Validate, ValidationError};

use crate::{
    common::error::{AnalyticsError, ApiError, AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::analytics::{
        AbcSummary, AbcThresholds, ClassifiedProduct, ProductSalesRecord, StockValuationRecord,
        ValorisationMetrics,
    },
    services::{abc_classifier, valorisation},
};

// ---
// Validação Customizada: período no formato YYYY-MM
// ---
fn validate_period(period: &str) -> Result<(), ValidationError> {
    if period.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d").is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("period");
    err.message = Some("O período deve estar no formato AAAA-MM.".into());
    Err(err)
}

fn thresholds_from(
    a_threshold: Option<Decimal>,
    b_threshold: Option<Decimal>,
) -> Result<AbcThresholds, AnalyticsError> {
    let defaults = AbcThresholds::default();
    AbcThresholds::new(
        a_threshold.unwrap_or(defaults.a()),
        b_threshold.unwrap_or(defaults.b()),
    )
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AbcQuery {
    #[validate(custom(function = "validate_period"))]
    #[param(example = "2026-09")]
    pub period: String,
    #[param(value_type = Option<f64>, example = 80)]
    pub a_threshold: Option<Decimal>,
    #[param(value_type = Option<f64>, example = 95)]
    pub b_threshold: Option<Decimal>,
}

// GET /api/analytics/abc
#[utoipa::path(
    get,
    path = "/api/analytics/abc",
    tag = "Analytics",
    params(
        AbcQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Produtos classificados (Curva ABC)", body = Vec<ClassifiedProduct>),
        (status = 400, description = "Parâmetros inválidos"),
        (status = 422, description = "Dados de venda inválidos (faturamento negativo)")
    )
)]
pub async fn get_abc_analysis(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    query: Result<Query<AbcQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Query(params) = query.map_err(AppError::from)?;
    params.validate().map_err(AppError::ValidationError)?;

    let thresholds = thresholds_from(params.a_threshold, params.b_threshold).map_err(AppError::from)?;

    let classified = app_state
        .analytics_service
        .abc_analysis(tenant.0, &params.period, thresholds)
        .await?;

    Ok((StatusCode::OK, Json(classified)))
}

// GET /api/analytics/abc/summary
#[utoipa::path(
    get,
    path = "/api/analytics/abc/summary",
    tag = "Analytics",
    params(
        AbcQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Totais por classe A/B/C", body = AbcSummary)
    )
)]
pub async fn get_abc_summary(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    query: Result<Query<AbcQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Query(params) = query.map_err(AppError::from)?;
    params.validate().map_err(AppError::ValidationError)?;

    let thresholds = thresholds_from(params.a_threshold, params.b_threshold).map_err(AppError::from)?;

    let summary = app_state
        .analytics_service
        .abc_summary(tenant.0, &params.period, thresholds)
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyPayload {
    pub products: Vec<ProductSalesRecord>,
    #[schema(value_type = Option<f64>, example = 80)]
    pub a_threshold: Option<Decimal>,
    #[schema(value_type = Option<f64>, example = 95)]
    pub b_threshold: Option<Decimal>,
}

// POST /api/analytics/abc
// Classifica os registros enviados, sem tocar no banco
#[utoipa::path(
    post,
    path = "/api/analytics/abc",
    tag = "Analytics",
    request_body = ClassifyPayload,
    responses(
        (status = 200, description = "Produtos classificados (Curva ABC)", body = Vec<ClassifiedProduct>),
        (status = 422, description = "Faturamento negativo")
    )
)]
pub async fn classify_products(
    Json(payload): Json<ClassifyPayload>,
) -> Result<impl IntoResponse, ApiError> {

    let thresholds = thresholds_from(payload.a_threshold, payload.b_threshold).map_err(AppError::from)?;

    let classified = abc_classifier::classify_with(&payload.products, thresholds)
        .map_err(AppError::from)?;

    Ok((StatusCode::OK, Json(classified)))
}

// GET /api/analytics/valorisation
#[utoipa::path(
    get,
    path = "/api/analytics/valorisation",
    tag = "Analytics",
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Farmácia")
    ),
    responses(
        (status = 200, description = "Valorização do estoque", body = ValorisationMetrics),
        (status = 422, description = "Quantidade ou custo negativo")
    )
)]
pub async fn get_valorisation(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {

    let metrics = app_state
        .analytics_service
        .valorisation(tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(metrics)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AggregatePayload {
    pub records: Vec<StockValuationRecord>,
}

// POST /api/analytics/valorisation
#[utoipa::path(
    post,
    path = "/api/analytics/valorisation",
    tag = "Analytics",
    request_body = AggregatePayload,
    responses(
        (status = 200, description = "Valorização dos registros enviados", body = ValorisationMetrics),
        (status = 422, description = "Quantidade ou custo negativo")
    )
)]
pub async fn aggregate_valorisation(
    Json(payload): Json<AggregatePayload>,
) -> Result<impl IntoResponse, ApiError> {

    let metrics = valorisation::aggregate(&payload.records).map_err(AppError::from)?;

    Ok((StatusCode::OK, Json(metrics)))
}
