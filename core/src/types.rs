//! Shared primitive types used across the dashboard core.

use serde::{Deserialize, Serialize};

/// A stable, unique customer identifier from the source table.
pub type CustomerId = u64;

/// The three product lines tracked by the penetration chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    CreditCard,
    Loan,
    Investments,
}

impl Product {
    /// Fixed chart series order.
    pub const ALL: [Product; 3] = [Product::CreditCard, Product::Loan, Product::Investments];

    /// Display label as rendered in the penetration chart legend.
    pub fn label(self) -> &'static str {
        match self {
            Product::CreditCard => "Credit Card",
            Product::Loan => "Loan",
            Product::Investments => "Investments",
        }
    }
}
