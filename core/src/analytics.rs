//! Aggregation engine — derived tables for the dashboard.
//!
//! This module computes:
//!   1. The filtered row subset for a segment selection
//!   2. Portfolio KPIs (count, average income/balance/products)
//!   3. Segment distribution (the donut chart)
//!   4. Product penetration by segment (the grouped bar chart)
//!   5. Cross-sell offer mix (the campaign bar chart)
//!
//! Every operation is pure and deterministic: identical inputs produce
//! identical output, and all emitted sequences carry a documented sort
//! order so charts render stably across recomputations.

use crate::{
    dataset::{CustomerRecord, Dataset},
    types::Product,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Derived types ────────────────────────────────────────────────────────────

/// Headline statistics for the filtered subset.
///
/// `avg_income` and `avg_balance` are truncated to whole currency units,
/// `avg_product_count` is rounded to two decimals. Display rules only;
/// the underlying table keeps full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub customers: u64,
    pub avg_income: i64,
    pub avg_balance: i64,
    pub avg_product_count: f64,
}

/// Customer count for one segment present in the filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: String,
    pub customers: u64,
}

/// Per-segment product penetration, each percentage in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPenetration {
    pub segment: String,
    pub customers: u64,
    pub credit_card_pct: f64,
    pub loan_pct: f64,
    pub investments_pct: f64,
}

impl SegmentPenetration {
    pub fn pct(&self, product: Product) -> f64 {
        match product {
            Product::CreditCard => self.credit_card_pct,
            Product::Loan => self.loan_pct,
            Product::Investments => self.investments_pct,
        }
    }
}

/// Customer count for one recommended cross-sell offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferCount {
    pub offer: String,
    pub customers: u64,
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Rows whose segment is in the selection, in original table order.
/// An empty selection is legal and yields an empty subset.
pub fn filter_by_segments<'a>(
    dataset: &'a Dataset,
    selected: &BTreeSet<String>,
) -> Vec<&'a CustomerRecord> {
    dataset
        .rows()
        .iter()
        .filter(|r| selected.contains(&r.segment_name))
        .collect()
}

/// KPI summary for the filtered subset.
/// Returns None for an empty subset: averages are undefined, and the
/// calling layer renders a "no data" state instead.
pub fn compute_kpis(rows: &[&CustomerRecord]) -> Option<KpiSummary> {
    if rows.is_empty() {
        log::debug!("analytics: empty selection, no KPI summary");
        return None;
    }

    let n = rows.len() as f64;
    let income_total: f64 = rows.iter().map(|r| r.income).sum();
    let balance_total: f64 = rows.iter().map(|r| r.avg_balance).sum();
    let product_total: f64 = rows.iter().map(|r| f64::from(r.product_count)).sum();

    Some(KpiSummary {
        customers: rows.len() as u64,
        avg_income: (income_total / n) as i64,
        avg_balance: (balance_total / n) as i64,
        avg_product_count: (product_total / n * 100.0).round() / 100.0,
    })
}

/// Customer count per segment, ascending by segment name.
/// Segments absent from the subset are omitted, not zero-filled.
pub fn compute_segment_distribution(rows: &[&CustomerRecord]) -> Vec<SegmentCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.segment_name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(segment, customers)| SegmentCount {
            segment: segment.to_string(),
            customers,
        })
        .collect()
}

/// Product penetration per segment, ascending by segment name.
/// A group only exists with at least one row, so the denominator is
/// never zero.
pub fn compute_product_penetration(rows: &[&CustomerRecord]) -> Vec<SegmentPenetration> {
    #[derive(Default)]
    struct Tally {
        customers: u64,
        credit_card: u64,
        loan: u64,
        investments: u64,
    }

    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for row in rows {
        let tally = groups.entry(row.segment_name.as_str()).or_default();
        tally.customers += 1;
        if row.has_credit_card {
            tally.credit_card += 1;
        }
        if row.has_loan {
            tally.loan += 1;
        }
        if row.has_investments {
            tally.investments += 1;
        }
    }

    groups
        .into_iter()
        .map(|(segment, tally)| {
            let n = tally.customers as f64;
            SegmentPenetration {
                segment: segment.to_string(),
                customers: tally.customers,
                credit_card_pct: tally.credit_card as f64 / n * 100.0,
                loan_pct: tally.loan as f64 / n * 100.0,
                investments_pct: tally.investments as f64 / n * 100.0,
            }
        })
        .collect()
}

/// Recommended-offer mix, descending by customer count.
/// Ties break ascending by offer label.
pub fn compute_offer_distribution(rows: &[&CustomerRecord]) -> Vec<OfferCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.cross_sell_offer.as_str()).or_insert(0) += 1;
    }

    let mut mix: Vec<OfferCount> = counts
        .into_iter()
        .map(|(offer, customers)| OfferCount {
            offer: offer.to_string(),
            customers,
        })
        .collect();
    // BTreeMap iteration is ascending by label; the stable sort keeps
    // that order within equal counts.
    mix.sort_by(|a, b| b.customers.cmp(&a.customers));
    mix
}
