// src/models/analytics.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AnalyticsError;

// =============================================================================
//  1. CURVA ABC
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AbcClass {
    A,
    B,
    C,
}

// Vendas de um produto no período analisado (entrada da Curva ABC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesRecord {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,
    #[schema(example = "Doliprane 1000mg")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Antalgiques")]
    pub category: Option<String>,
    #[schema(value_type = f64, example = 1250.40)]
    pub revenue: Decimal,
    #[serde(default)]
    #[schema(example = 312)]
    pub quantity_sold: i64,
    #[serde(default)]
    #[schema(example = 48)]
    pub current_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedProduct {
    #[serde(flatten)]
    pub product: ProductSalesRecord,
    #[schema(example = 1)]
    pub rank: usize,
    #[schema(value_type = f64, example = 42.5)]
    pub revenue_share: Decimal,
    #[schema(value_type = f64, example = 42.5)]
    pub cumulative_share: Decimal,
    pub abc_class: AbcClass,
}

/// Limites cumulativos (em %) que separam as classes A, B e C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcThresholds {
    #[schema(value_type = f64, example = 80)]
    a: Decimal,
    #[schema(value_type = f64, example = 95)]
    b: Decimal,
}

impl AbcThresholds {
    pub fn new(a: Decimal, b: Decimal) -> Result<Self, AnalyticsError> {
        if a <= Decimal::ZERO || a > b || b > Decimal::ONE_HUNDRED {
            return Err(AnalyticsError::InvalidThresholds { a, b });
        }
        Ok(Self { a, b })
    }

    pub fn a(&self) -> Decimal {
        self.a
    }

    pub fn b(&self) -> Decimal {
        self.b
    }

    // Classe pela participação cumulativa *depois* de incluir o produto
    pub fn class_for(&self, cumulative_share: Decimal) -> AbcClass {
        if cumulative_share <= self.a {
            AbcClass::A
        } else if cumulative_share <= self.b {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl Default for AbcThresholds {
    fn default() -> Self {
        Self { a: dec!(80), b: dec!(95) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcClassSummary {
    pub count: usize,
    #[schema(value_type = f64)]
    pub revenue: Decimal,
    #[schema(value_type = f64)]
    pub revenue_share: Decimal,
}

// Resumo por classe (os cards da tela de análise ABC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcSummary {
    pub product_count: usize,
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    pub class_a: AbcClassSummary,
    pub class_b: AbcClassSummary,
    pub class_c: AbcClassSummary,
}

// =============================================================================
//  2. VALORIZAÇÃO DO ESTOQUE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockTrend {
    Up,
    Down,
    #[default]
    Stable,
}

impl StockTrend {
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            StockTrend::Up
        } else if delta < Decimal::ZERO {
            StockTrend::Down
        } else {
            StockTrend::Stable
        }
    }
}

// Saldo valorizado de um produto. O valor total nunca é armazenado:
// é sempre quantidade x custo unitário.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockValuationRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[schema(example = 10)]
    pub quantity_on_hand: i64,
    #[schema(value_type = f64, example = 2.5)]
    pub unit_cost: Decimal,
    // Tendência já calculada pela camada de dados (comparação com o período anterior)
    #[serde(default)]
    pub trend: StockTrend,
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 4.2)]
    pub trend_delta: Option<Decimal>,
}

impl StockValuationRecord {
    /// `None` quando o produto não cabe num `Decimal`.
    pub fn total_value(&self) -> Option<Decimal> {
        Decimal::from(self.quantity_on_hand).checked_mul(self.unit_cost)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationLine {
    pub id: String,
    pub name: String,
    pub quantity_on_hand: i64,
    #[schema(value_type = f64)]
    pub unit_cost: Decimal,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    #[schema(value_type = f64)]
    pub share_of_total: Decimal,
    pub trend: StockTrend,
    #[schema(value_type = Option<f64>)]
    pub trend_delta: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendBreakdown {
    pub up: usize,
    pub down: usize,
    pub stable: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValorisationMetrics {
    #[schema(value_type = f64, example = 25)]
    pub total_value: Decimal,
    #[schema(example = 1)]
    pub product_count: usize,
    #[schema(value_type = f64, example = 25)]
    pub average_value_per_product: Decimal,
    #[schema(value_type = Option<f64>)]
    pub average_trend: Option<Decimal>,
    pub overall_trend: StockTrend,
    pub trend_breakdown: TrendBreakdown,
    pub lines: Vec<ValuationLine>,
}
