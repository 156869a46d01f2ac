//! Dataset loading and the immutable in-memory customer table.
//!
//! RULE: The dataset is loaded once at startup and never mutated.
//! All derived tables are recomputed from it on every interaction;
//! nothing downstream caches or persists.
//!
//! The loader is strict: a missing column or malformed row aborts the
//! load with a named error rather than skipping rows silently. The one
//! tolerated data-quality issue is a duplicate customer_id: the first
//! occurrence wins for lookup and a warning is logged.

use crate::{
    error::{DashResult, DashboardError},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

/// Canonical column order. Load validation and CSV export both use it.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "customer_id",
    "age",
    "segment_name",
    "income",
    "avg_balance",
    "product_count",
    "risk_score",
    "has_credit_card",
    "has_loan",
    "has_investments",
    "cross_sell_offer",
];

/// One row of the source table, validated and typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    pub age: u32,
    pub segment_name: String,
    pub income: f64,
    pub avg_balance: f64,
    pub product_count: u32,
    pub risk_score: f64,
    pub has_credit_card: bool,
    pub has_loan: bool,
    pub has_investments: bool,
    pub cross_sell_offer: String,
}

/// Raw CSV row as decoded by serde, before validation.
#[derive(Debug, Deserialize)]
struct RawCustomerRow {
    customer_id: CustomerId,
    age: u32,
    segment_name: String,
    income: f64,
    avg_balance: f64,
    product_count: u32,
    risk_score: f64,
    has_credit_card: u8,
    has_loan: u8,
    has_investments: u8,
    cross_sell_offer: String,
}

impl RawCustomerRow {
    fn validate(self, line: usize, unknown_label: &str) -> DashResult<CustomerRecord> {
        if self.income < 0.0 {
            return Err(DashboardError::Malformed {
                line,
                message: format!("income must be non-negative, got {}", self.income),
            });
        }
        if self.avg_balance < 0.0 {
            return Err(DashboardError::Malformed {
                line,
                message: format!("avg_balance must be non-negative, got {}", self.avg_balance),
            });
        }

        Ok(CustomerRecord {
            customer_id: self.customer_id,
            age: self.age,
            segment_name: normalize_label(&self.segment_name, unknown_label),
            income: self.income,
            avg_balance: self.avg_balance,
            product_count: self.product_count,
            risk_score: self.risk_score,
            has_credit_card: flag_to_bool(self.has_credit_card, "has_credit_card", line)?,
            has_loan: flag_to_bool(self.has_loan, "has_loan", line)?,
            has_investments: flag_to_bool(self.has_investments, "has_investments", line)?,
            cross_sell_offer: normalize_label(&self.cross_sell_offer, unknown_label),
        })
    }
}

/// Product flags are 0/1 in the file; anything else is rejected.
fn flag_to_bool(value: u8, column: &str, line: usize) -> DashResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DashboardError::Malformed {
            line,
            message: format!("{column} must be 0 or 1, got {other}"),
        }),
    }
}

/// Empty categorical values become the configured unknown label
/// instead of being dropped.
fn normalize_label(value: &str, unknown_label: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        unknown_label.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The full customer table plus a customer_id lookup index.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<CustomerRecord>,
    by_id: HashMap<CustomerId, usize>,
}

impl Dataset {
    /// Load the table from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P, unknown_label: &str) -> DashResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file, unknown_label)?;
        log::info!(
            "dataset: loaded {} customers across {} segments from {}",
            dataset.len(),
            dataset.segment_names().len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load the table from any reader producing CSV with headers.
    pub fn from_reader<R: Read>(reader: R, unknown_label: &str) -> DashResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(DashboardError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        let mut rows = Vec::new();
        for (idx, result) in csv_reader.deserialize::<RawCustomerRow>().enumerate() {
            // Header is line 1, first record line 2.
            let line = idx + 2;
            let raw = result?;
            rows.push(raw.validate(line, unknown_label)?);
        }

        Ok(Self::from_records(rows))
    }

    /// Build a dataset from already-validated records. Used by tests.
    pub fn from_records(rows: Vec<CustomerRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match by_id.entry(row.customer_id) {
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
                std::collections::hash_map::Entry::Occupied(_) => {
                    log::warn!(
                        "dataset: duplicate customer_id {}, keeping first occurrence",
                        row.customer_id
                    );
                }
            }
        }
        Self { rows, by_id }
    }

    pub fn rows(&self) -> &[CustomerRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact-match lookup against the unfiltered table.
    /// None is the user-facing "not found" state, not an error.
    pub fn lookup_customer(&self, customer_id: CustomerId) -> Option<&CustomerRecord> {
        self.by_id.get(&customer_id).map(|&idx| &self.rows[idx])
    }

    /// Sorted unique segment labels for the filter widget.
    pub fn segment_names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.segment_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Min and max customer_id, the bounds of the lookup input.
    pub fn customer_id_range(&self) -> Option<(CustomerId, CustomerId)> {
        let min = self.rows.iter().map(|r| r.customer_id).min()?;
        let max = self.rows.iter().map(|r| r.customer_id).max()?;
        Some((min, max))
    }
}
