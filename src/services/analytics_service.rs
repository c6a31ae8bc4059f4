// src/services/analytics_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::data_access::TenantDataAccess,
    models::{
        analytics::{
            AbcSummary, AbcThresholds, ClassifiedProduct, ProductSalesRecord, StockTrend,
            StockValuationRecord, ValorisationMetrics,
        },
        data::{Filters, QueryOptions, Row},
    },
    services::{abc_classifier, valorisation},
};

const SALES_TABLE: &str = "product_sales_monthly";
const SALES_COLUMNS: &str = "id,name,category,revenue,quantity_sold,current_stock";
const VALUATION_TABLE: &str = "stock_valuation";
const VALUATION_COLUMNS: &str = "id,name,quantity_on_hand,unit_cost,trend,trend_delta";

// As linhas vêm do banco em snake_case; os modelos da API são camelCase.
#[derive(Debug, Deserialize)]
struct SalesRow {
    id: String,
    name: String,
    category: Option<String>,
    revenue: Option<Decimal>,
    quantity_sold: Option<i64>,
    current_stock: Option<i64>,
}

impl From<SalesRow> for ProductSalesRecord {
    fn from(row: SalesRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            revenue: row.revenue.unwrap_or(Decimal::ZERO),
            quantity_sold: row.quantity_sold.unwrap_or(0),
            current_stock: row.current_stock.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValuationRow {
    id: String,
    name: String,
    quantity_on_hand: Option<i64>,
    unit_cost: Option<Decimal>,
    trend: Option<StockTrend>,
    trend_delta: Option<Decimal>,
}

impl From<ValuationRow> for StockValuationRecord {
    fn from(row: ValuationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            quantity_on_hand: row.quantity_on_hand.unwrap_or(0),
            unit_cost: row.unit_cost.unwrap_or(Decimal::ZERO),
            trend: row.trend.unwrap_or_default(),
            trend_delta: row.trend_delta,
        }
    }
}

fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row)).map_err(|e| AppError::InvalidRow {
                table: table.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct AnalyticsService {
    data_access: Arc<dyn TenantDataAccess>,
}

impl AnalyticsService {
    pub fn new(data_access: Arc<dyn TenantDataAccess>) -> Self {
        Self { data_access }
    }

    async fn sales_for_period(
        &self,
        tenant_id: Uuid,
        period: &str,
    ) -> Result<Vec<ProductSalesRecord>, AppError> {
        let mut filters = Filters::new();
        filters.insert("period".into(), Value::String(period.to_string()));

        let rows = self
            .data_access
            .query(tenant_id, SALES_TABLE, SALES_COLUMNS, &filters, &QueryOptions::default())
            .await?;

        let records: Vec<SalesRow> = decode_rows(SALES_TABLE, rows)?;
        Ok(records.into_iter().map(ProductSalesRecord::from).collect())
    }

    // --- CURVA ABC (dados gravados) ---
    pub async fn abc_analysis(
        &self,
        tenant_id: Uuid,
        period: &str,
        thresholds: AbcThresholds,
    ) -> Result<Vec<ClassifiedProduct>, AppError> {
        let records = self.sales_for_period(tenant_id, period).await?;
        let classified = abc_classifier::classify_with(&records, thresholds)?;

        tracing::info!(%tenant_id, period, products = classified.len(), "Curva ABC calculada");
        Ok(classified)
    }

    pub async fn abc_summary(
        &self,
        tenant_id: Uuid,
        period: &str,
        thresholds: AbcThresholds,
    ) -> Result<AbcSummary, AppError> {
        let classified = self.abc_analysis(tenant_id, period, thresholds).await?;
        Ok(abc_classifier::summarize(&classified))
    }

    // --- VALORIZAÇÃO (dados gravados) ---
    pub async fn valorisation(&self, tenant_id: Uuid) -> Result<ValorisationMetrics, AppError> {
        let rows = self
            .data_access
            .query(
                tenant_id,
                VALUATION_TABLE,
                VALUATION_COLUMNS,
                &Filters::new(),
                &QueryOptions::default(),
            )
            .await?;

        let records: Vec<StockValuationRecord> = decode_rows::<ValuationRow>(VALUATION_TABLE, rows)?
            .into_iter()
            .map(StockValuationRecord::from)
            .collect();

        let metrics = valorisation::aggregate(&records)?;

        tracing::info!(
            %tenant_id,
            products = metrics.product_count,
            total = %metrics.total_value,
            "Valorização do estoque calculada"
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::AnalyticsError,
        db::memory_store::InMemoryTenantStore,
        models::analytics::AbcClass,
    };
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn tenant() -> Uuid {
        Uuid::parse_str("6f1c2a9e-1d4b-4c1a-9a57-0c1d2e3f4a5b").unwrap()
    }

    fn service_with(store: InMemoryTenantStore) -> AnalyticsService {
        AnalyticsService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn abc_reads_only_the_requested_period_and_tenant() {
        let store = InMemoryTenantStore::new();
        store.seed(
            tenant(),
            SALES_TABLE,
            vec![
                json!({ "period": "2026-09", "id": "p1", "name": "Doliprane", "category": "Antalgiques", "revenue": 800, "quantity_sold": 400, "current_stock": 20 }),
                json!({ "period": "2026-09", "id": "p2", "name": "Smecta", "category": null, "revenue": 150, "quantity_sold": 30, "current_stock": 5 }),
                json!({ "period": "2026-09", "id": "p3", "name": "Biafine", "category": null, "revenue": 50, "quantity_sold": 7, "current_stock": 2 }),
                json!({ "period": "2026-08", "id": "p4", "name": "Ancien", "category": null, "revenue": 9999, "quantity_sold": 1, "current_stock": 0 }),
            ],
        );
        store.seed(
            Uuid::new_v4(),
            SALES_TABLE,
            vec![json!({ "period": "2026-09", "id": "other", "name": "Autre", "category": null, "revenue": 5000, "quantity_sold": 1, "current_stock": 0 })],
        );

        let result = service_with(store)
            .abc_analysis(tenant(), "2026-09", AbcThresholds::default())
            .await
            .unwrap();

        let got: Vec<(&str, AbcClass)> = result
            .iter()
            .map(|c| (c.product.id.as_str(), c.abc_class))
            .collect();
        assert_eq!(got, vec![("p1", AbcClass::A), ("p2", AbcClass::B), ("p3", AbcClass::C)]);
        assert_eq!(result[0].product.quantity_sold, 400);
    }

    #[tokio::test]
    async fn abc_summary_for_empty_period() {
        let summary = service_with(InMemoryTenantStore::new())
            .abc_summary(tenant(), "2026-01", AbcThresholds::default())
            .await
            .unwrap();

        assert_eq!(summary, AbcSummary::default());
    }

    #[tokio::test]
    async fn negative_revenue_surfaces_as_invalid_input() {
        let store = InMemoryTenantStore::new();
        store.seed(
            tenant(),
            SALES_TABLE,
            vec![json!({ "period": "2026-09", "id": "refund", "name": "Avoir", "category": null, "revenue": -12.5, "quantity_sold": 0, "current_stock": 0 })],
        );

        let err = service_with(store)
            .abc_analysis(tenant(), "2026-09", AbcThresholds::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Analytics(AnalyticsError::InvalidInput { field: "revenue", .. })
        ));
    }

    #[tokio::test]
    async fn valorisation_aggregates_stored_stock() {
        let store = InMemoryTenantStore::new();
        store.seed(
            tenant(),
            VALUATION_TABLE,
            vec![
                json!({ "id": "p1", "name": "Doliprane", "quantity_on_hand": 10, "unit_cost": 2.5, "trend": "up", "trend_delta": 10 }),
                json!({ "id": "p2", "name": "Smecta", "quantity_on_hand": 4, "unit_cost": 3.1, "trend": null, "trend_delta": null }),
            ],
        );

        let metrics = service_with(store).valorisation(tenant()).await.unwrap();

        assert_eq!(metrics.total_value, dec!(37.4));
        assert_eq!(metrics.product_count, 2);
        assert_eq!(metrics.average_value_per_product, dec!(18.7));
        assert_eq!(metrics.average_trend, Some(dec!(10)));
        assert_eq!(metrics.trend_breakdown.up, 1);
        assert_eq!(metrics.trend_breakdown.stable, 1);
    }

    #[tokio::test]
    async fn malformed_rows_are_reported() {
        let store = InMemoryTenantStore::new();
        store.seed(
            tenant(),
            VALUATION_TABLE,
            vec![json!({ "id": "p1", "name": "Doliprane", "quantity_on_hand": "dez", "unit_cost": 2.5 })],
        );

        let err = service_with(store).valorisation(tenant()).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidRow { ref table, .. } if table == VALUATION_TABLE));
    }
}
