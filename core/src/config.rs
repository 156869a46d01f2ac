//! Dashboard configuration — one JSON file, loaded once at startup.
//!
//! The runner falls back to `DashboardConfig::default()` when no config
//! path is given; tests use the default directly.

use serde::{Deserialize, Serialize};

pub const DEFAULT_UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Path of the customer dataset CSV.
    pub data_file: String,

    /// Category assigned to empty `segment_name` / `cross_sell_offer` values.
    #[serde(default = "default_unknown_label")]
    pub unknown_label: String,

    /// Initial segment selection. None selects every segment in the data.
    #[serde(default)]
    pub default_segments: Option<Vec<String>>,
}

fn default_unknown_label() -> String {
    DEFAULT_UNKNOWN_LABEL.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: "customer_360.csv".to_string(),
            unknown_label: default_unknown_label(),
            default_segments: None,
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }
}
