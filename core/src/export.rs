//! CSV export of the filtered view.
//!
//! Produces UTF-8 bytes suitable for a `text/csv` download: headers in
//! the canonical column order, product flags re-encoded as 0/1 to match
//! the input format.

use crate::{
    dataset::{CustomerRecord, REQUIRED_COLUMNS},
    error::DashResult,
};

pub fn export_csv(rows: &[&CustomerRecord]) -> DashResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(REQUIRED_COLUMNS)?;
    for row in rows {
        writer.write_record(&[
            row.customer_id.to_string(),
            row.age.to_string(),
            row.segment_name.clone(),
            row.income.to_string(),
            row.avg_balance.to_string(),
            row.product_count.to_string(),
            row.risk_score.to_string(),
            u8::from(row.has_credit_card).to_string(),
            u8::from(row.has_loan).to_string(),
            u8::from(row.has_investments).to_string(),
            row.cross_sell_offer.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV export buffer flush failed: {e}").into())
}
