// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Analytics ---
        handlers::analytics::get_abc_analysis,
        handlers::analytics::get_abc_summary,
        handlers::analytics::classify_products,
        handlers::analytics::get_valorisation,
        handlers::analytics::aggregate_valorisation,

        // --- Data ---
        handlers::data::query_table,
        handlers::data::insert_row,
        handlers::data::update_row,
        handlers::data::delete_row,
    ),
    components(
        schemas(
            // --- Curva ABC ---
            models::analytics::AbcClass,
            models::analytics::ProductSalesRecord,
            models::analytics::ClassifiedProduct,
            models::analytics::AbcThresholds,
            models::analytics::AbcClassSummary,
            models::analytics::AbcSummary,

            // --- Valorização ---
            models::analytics::StockTrend,
            models::analytics::StockValuationRecord,
            models::analytics::ValuationLine,
            models::analytics::TrendBreakdown,
            models::analytics::ValorisationMetrics,

            // --- Payloads ---
            handlers::analytics::ClassifyPayload,
            handlers::analytics::AggregatePayload,

            // --- Data ---
            models::data::SortDirection,
            models::data::MutationOperation,
            models::data::MutationResult,

            // --- Estoque ---
            models::stock::MovementType,
            models::stock::AdjustmentReason,
            models::stock::StockMovementMetadata,
        )
    ),
    tags(
        (name = "Analytics", description = "Curva ABC e Valorização do Estoque"),
        (name = "Data", description = "Acesso genérico às tabelas da farmácia (por tenant)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_dashboard_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| *p == "/api/analytics/abc"));
        assert!(paths.iter().any(|p| *p == "/api/analytics/valorisation"));
        assert!(paths.iter().any(|p| *p == "/api/data/{table}/{id}"));
    }
}
