// src/services/valorisation.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AnalyticsError,
    models::analytics::{
        StockTrend, StockValuationRecord, TrendBreakdown, ValorisationMetrics, ValuationLine,
    },
};

// Valida o lote inteiro antes de somar: um registro ruim e nada é calculado.
fn validate(records: &[StockValuationRecord]) -> Result<(), AnalyticsError> {
    for record in records {
        if record.quantity_on_hand < 0 {
            return Err(AnalyticsError::InvalidInput {
                record_id: record.id.clone(),
                field: "quantityOnHand",
                value: Decimal::from(record.quantity_on_hand),
            });
        }
        if record.unit_cost < Decimal::ZERO {
            return Err(AnalyticsError::InvalidInput {
                record_id: record.id.clone(),
                field: "unitCost",
                value: record.unit_cost,
            });
        }
    }
    Ok(())
}

/// Valorização do estoque: total, média por produto e tendência agregada.
///
/// A tendência não é recalculada aqui. `trend` e `trend_delta` chegam prontos
/// da camada de dados; só fazemos a média dos deltas informados.
pub fn aggregate(records: &[StockValuationRecord]) -> Result<ValorisationMetrics, AnalyticsError> {
    validate(records)?;

    let overflow = |record: &StockValuationRecord, field| AnalyticsError::Overflow {
        record_id: record.id.clone(),
        field,
    };

    let mut values = Vec::with_capacity(records.len());
    let mut total_value = Decimal::ZERO;
    for record in records {
        let value = record.total_value().ok_or_else(|| overflow(record, "totalValue"))?;
        total_value = total_value
            .checked_add(value)
            .ok_or_else(|| overflow(record, "totalValue"))?;
        values.push(value);
    }
    let product_count = records.len();

    let average_value_per_product = if product_count > 0 {
        total_value / Decimal::from(product_count)
    } else {
        Decimal::ZERO
    };

    let mut delta_sum = Decimal::ZERO;
    let mut delta_count = 0usize;
    for record in records {
        if let Some(delta) = record.trend_delta {
            delta_sum = delta_sum
                .checked_add(delta)
                .ok_or_else(|| overflow(record, "trendDelta"))?;
            delta_count += 1;
        }
    }
    let average_trend = if delta_count == 0 {
        None
    } else {
        Some(delta_sum / Decimal::from(delta_count))
    };
    let overall_trend = average_trend.map(StockTrend::from_delta).unwrap_or_default();

    let mut trend_breakdown = TrendBreakdown::default();
    for record in records {
        match record.trend {
            StockTrend::Up => trend_breakdown.up += 1,
            StockTrend::Down => trend_breakdown.down += 1,
            StockTrend::Stable => trend_breakdown.stable += 1,
        }
    }

    let mut lines: Vec<ValuationLine> = records
        .iter()
        .zip(values)
        .map(|(record, value)| ValuationLine {
            id: record.id.clone(),
            name: record.name.clone(),
            quantity_on_hand: record.quantity_on_hand,
            unit_cost: record.unit_cost,
            total_value: value,
            share_of_total: if total_value.is_zero() {
                Decimal::ZERO
            } else {
                value / total_value * Decimal::ONE_HUNDRED
            },
            trend: record.trend,
            trend_delta: record.trend_delta,
        })
        .collect();
    // Maiores valores primeiro (estável para empates)
    lines.sort_by(|a, b| b.total_value.cmp(&a.total_value));

    Ok(ValorisationMetrics {
        total_value,
        product_count,
        average_value_per_product,
        average_trend,
        overall_trend,
        trend_breakdown,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(id: &str, quantity_on_hand: i64, unit_cost: Decimal) -> StockValuationRecord {
        StockValuationRecord {
            id: id.to_string(),
            name: format!("Produto {}", id),
            quantity_on_hand,
            unit_cost,
            trend: StockTrend::Stable,
            trend_delta: None,
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let metrics = aggregate(&[]).unwrap();

        assert_eq!(metrics.total_value, Decimal::ZERO);
        assert_eq!(metrics.product_count, 0);
        assert_eq!(metrics.average_value_per_product, Decimal::ZERO);
        assert_eq!(metrics.average_trend, None);
        assert_eq!(metrics.overall_trend, StockTrend::Stable);
        assert!(metrics.lines.is_empty());
    }

    #[test]
    fn single_record() {
        let metrics = aggregate(&[record("1", 10, dec!(2.5))]).unwrap();

        assert_eq!(metrics.total_value, dec!(25));
        assert_eq!(metrics.product_count, 1);
        assert_eq!(metrics.average_value_per_product, dec!(25));
        assert_eq!(metrics.lines[0].share_of_total, dec!(100));
    }

    #[test]
    fn total_is_exact_for_cent_costs() {
        // 0.1 + 0.2 em ponto flutuante daria 0.30000000000000004
        let records = vec![
            record("a", 1, dec!(0.10)),
            record("b", 1, dec!(0.20)),
            record("c", 3, dec!(19.99)),
            record("d", 1_000_000, dec!(0.01)),
        ];

        let metrics = aggregate(&records).unwrap();

        assert_eq!(metrics.total_value, dec!(10060.27));
        assert_eq!(metrics.total_value.to_string(), "10060.27");
    }

    #[test]
    fn negative_quantity_rejects_batch() {
        let records = vec![record("ok", 5, dec!(1)), record("bad", -1, dec!(1))];

        let err = aggregate(&records).unwrap_err();

        assert_eq!(
            err,
            AnalyticsError::InvalidInput {
                record_id: "bad".into(),
                field: "quantityOnHand",
                value: dec!(-1),
            }
        );
    }

    #[test]
    fn negative_cost_rejects_batch() {
        let err = aggregate(&[record("bad", 1, dec!(-0.5))]).unwrap_err();

        assert!(matches!(err, AnalyticsError::InvalidInput { field: "unitCost", .. }));
    }

    #[test]
    fn averages_only_supplied_trend_deltas() {
        let mut up = record("up", 1, dec!(10));
        up.trend = StockTrend::Up;
        up.trend_delta = Some(dec!(12));
        let mut down = record("down", 1, dec!(10));
        down.trend = StockTrend::Down;
        down.trend_delta = Some(dec!(-4));
        let unknown = record("unknown", 1, dec!(10));

        let metrics = aggregate(&[up, down, unknown]).unwrap();

        assert_eq!(metrics.average_trend, Some(dec!(4)));
        assert_eq!(metrics.overall_trend, StockTrend::Up);
        assert_eq!(
            metrics.trend_breakdown,
            TrendBreakdown { up: 1, down: 1, stable: 1 }
        );
    }

    #[test]
    fn lines_are_sorted_by_value() {
        let records = vec![
            record("cheap", 1, dec!(1)),
            record("dear", 2, dec!(50)),
            record("mid", 10, dec!(3)),
        ];

        let metrics = aggregate(&records).unwrap();

        let ids: Vec<&str> = metrics.lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["dear", "mid", "cheap"]);
        assert_eq!(metrics.average_value_per_product, dec!(131) / dec!(3));
    }

    #[test]
    fn line_value_overflow_is_an_error() {
        let records = vec![
            record("ok", 1, dec!(1)),
            record("huge", i64::MAX, dec!(100000000000)),
        ];

        let err = aggregate(&records).unwrap_err();

        assert_eq!(
            err,
            AnalyticsError::Overflow { record_id: "huge".into(), field: "totalValue" }
        );
    }

    #[test]
    fn portfolio_total_overflow_is_an_error() {
        // Cada linha cabe sozinha; a soma não
        let cost = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
        let records = vec![record("a", 1, cost), record("b", 1, cost)];

        let err = aggregate(&records).unwrap_err();

        assert!(matches!(err, AnalyticsError::Overflow { ref record_id, .. } if record_id == "b"));
    }

    #[test]
    fn zero_cost_stock_has_zero_shares() {
        let metrics = aggregate(&[record("free", 4, dec!(0))]).unwrap();

        assert_eq!(metrics.total_value, Decimal::ZERO);
        assert_eq!(metrics.lines[0].share_of_total, Decimal::ZERO);
    }
}
