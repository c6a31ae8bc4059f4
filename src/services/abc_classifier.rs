// src/services/abc_classifier.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AnalyticsError,
    models::analytics::{
        AbcClass, AbcClassSummary, AbcSummary, AbcThresholds, ClassifiedProduct,
        ProductSalesRecord,
    },
};

/// Curva ABC com os limites padrão (80% / 95%).
pub fn classify(products: &[ProductSalesRecord]) -> Result<Vec<ClassifiedProduct>, AnalyticsError> {
    classify_with(products, AbcThresholds::default())
}

/// Classifica os produtos pela participação no faturamento do período.
///
/// A classe é decidida pela participação cumulativa *depois* de incluir o produto.
/// O primeiro produto do ranking com faturamento > 0 é sempre A, mesmo sozinho
/// ultrapassando o limite. Faturamento total zero deixa todos em C.
/// Qualquer faturamento negativo rejeita o lote inteiro.
pub fn classify_with(
    products: &[ProductSalesRecord],
    thresholds: AbcThresholds,
) -> Result<Vec<ClassifiedProduct>, AnalyticsError> {
    // 1. Validação (antes de qualquer cálculo)
    if let Some(bad) = products.iter().find(|p| p.revenue < Decimal::ZERO) {
        return Err(AnalyticsError::InvalidInput {
            record_id: bad.id.clone(),
            field: "revenue",
            value: bad.revenue,
        });
    }

    // Soma verificada: overflow vira AnalyticsError::Overflow
    let mut total_revenue = Decimal::ZERO;
    for p in products {
        total_revenue = total_revenue.checked_add(p.revenue).ok_or_else(|| {
            AnalyticsError::Overflow { record_id: p.id.clone(), field: "revenue" }
        })?;
    }

    // 2. Ordena por faturamento desc. `sort_by` é estável: empates mantêm a ordem de entrada.
    let mut ranked: Vec<&ProductSalesRecord> = products.iter().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    // 3. Participação e acumulado (o acumulado nunca passa do total já verificado)
    let mut cumulative_revenue = Decimal::ZERO;
    let classified = ranked
        .into_iter()
        .enumerate()
        .map(|(index, product)| {
            cumulative_revenue += product.revenue;

            let (revenue_share, cumulative_share) = if total_revenue.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                (
                    percent_of(product.revenue, total_revenue),
                    percent_of(cumulative_revenue, total_revenue),
                )
            };

            let abc_class = if total_revenue.is_zero() {
                AbcClass::C
            } else if index == 0 {
                AbcClass::A
            } else {
                thresholds.class_for(cumulative_share)
            };

            ClassifiedProduct {
                product: product.clone(),
                rank: index + 1,
                revenue_share,
                cumulative_share,
                abc_class,
            }
        })
        .collect();

    Ok(classified)
}

/// Totais por classe para os cards do painel.
/// Espera a saída de `classify`, cujas somas já foram verificadas.
pub fn summarize(classified: &[ClassifiedProduct]) -> AbcSummary {
    let total_revenue: Decimal = classified.iter().map(|c| c.product.revenue).sum();

    let mut summary = AbcSummary {
        product_count: classified.len(),
        total_revenue,
        ..Default::default()
    };

    for item in classified {
        let bucket = match item.abc_class {
            AbcClass::A => &mut summary.class_a,
            AbcClass::B => &mut summary.class_b,
            AbcClass::C => &mut summary.class_c,
        };
        bucket.count += 1;
        bucket.revenue += item.product.revenue;
    }

    for bucket in [&mut summary.class_a, &mut summary.class_b, &mut summary.class_c] {
        fill_share(bucket, total_revenue);
    }

    summary
}

fn fill_share(bucket: &mut AbcClassSummary, total_revenue: Decimal) {
    bucket.revenue_share = if total_revenue.is_zero() {
        Decimal::ZERO
    } else {
        percent_of(bucket.revenue, total_revenue)
    };
}

// Divide antes de multiplicar: com part <= total o resultado fica em [0, 100]
fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    part / total * Decimal::ONE_HUNDRED
}
