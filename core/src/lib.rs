//! Customer 360 segmentation & cross-sell analytics core.
//!
//! Loads a pre-computed customer segmentation dataset into an immutable
//! in-memory table and derives everything a dashboard shell renders:
//! KPI summary, segment distribution, product penetration by segment,
//! cross-sell offer mix, single-customer 360 lookup, and CSV export of
//! the filtered view.

pub mod analytics;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod session;
pub mod types;

pub use error::{DashResult, DashboardError};
