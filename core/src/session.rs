//! Dashboard session — one loaded dataset plus the current filter selection.
//!
//! Interaction model: the table is an immutable snapshot for the life of
//! the session; every filter change recomputes the full view from scratch.
//! Lookups always run against the unfiltered table, independent of the
//! current selection.

use crate::{
    analytics::{
        compute_kpis, compute_offer_distribution, compute_product_penetration,
        compute_segment_distribution, filter_by_segments, KpiSummary, OfferCount, SegmentCount,
        SegmentPenetration,
    },
    config::DashboardConfig,
    dataset::{CustomerRecord, Dataset},
    error::DashResult,
    export::export_csv,
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── View types ───────────────────────────────────────────────────────────────

/// Everything the presentation layer renders for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub selected_segments: Vec<String>,
    pub kpis: Option<KpiSummary>,
    pub segment_distribution: Vec<SegmentCount>,
    pub product_penetration: Vec<SegmentPenetration>,
    pub offer_mix: Vec<OfferCount>,
}

/// The three-panel customer 360 lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer360View {
    pub profile: CustomerProfile,
    pub holdings: ProductHoldings,
    pub recommended_offer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub age: u32,
    pub income: f64,
    pub avg_balance: f64,
    pub segment_name: String,
    pub product_count: u32,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductHoldings {
    pub has_credit_card: bool,
    pub has_loan: bool,
    pub has_investments: bool,
}

impl Customer360View {
    pub fn from_record(record: &CustomerRecord) -> Self {
        Self {
            profile: CustomerProfile {
                customer_id: record.customer_id,
                age: record.age,
                income: record.income,
                avg_balance: record.avg_balance,
                segment_name: record.segment_name.clone(),
                product_count: record.product_count,
                risk_score: record.risk_score,
            },
            holdings: ProductHoldings {
                has_credit_card: record.has_credit_card,
                has_loan: record.has_loan,
                has_investments: record.has_investments,
            },
            recommended_offer: record.cross_sell_offer.clone(),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

pub struct DashboardSession {
    dataset: Dataset,
    selected: BTreeSet<String>,
}

impl DashboardSession {
    /// Open a session. The initial selection comes from the config's
    /// `default_segments`, or every segment present in the data.
    pub fn new(dataset: Dataset, config: &DashboardConfig) -> Self {
        let selected = match &config.default_segments {
            Some(segments) => segments.iter().cloned().collect(),
            None => dataset.segment_names().into_iter().collect(),
        };
        Self { dataset, selected }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selected_segments(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Replace the segment selection. An empty selection is legal;
    /// the next view degrades to empty aggregates.
    pub fn set_filter(&mut self, segments: impl IntoIterator<Item = String>) {
        self.selected = segments.into_iter().collect();
        log::info!("session: filter set to {} segments", self.selected.len());
    }

    /// Recompute the full dashboard view for the current selection.
    pub fn view(&self) -> DashboardView {
        let rows = filter_by_segments(&self.dataset, &self.selected);
        DashboardView {
            selected_segments: self.selected.iter().cloned().collect(),
            kpis: compute_kpis(&rows),
            segment_distribution: compute_segment_distribution(&rows),
            product_penetration: compute_product_penetration(&rows),
            offer_mix: compute_offer_distribution(&rows),
        }
    }

    /// Customer 360 lookup against the unfiltered table.
    pub fn lookup(&self, customer_id: CustomerId) -> Option<Customer360View> {
        self.dataset
            .lookup_customer(customer_id)
            .map(Customer360View::from_record)
    }

    /// CSV bytes of the currently filtered rows.
    pub fn export_filtered_csv(&self) -> DashResult<Vec<u8>> {
        let rows = filter_by_segments(&self.dataset, &self.selected);
        export_csv(&rows)
    }
}
