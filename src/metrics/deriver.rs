//! Cleaning pass over the summary table.
//!
//! Numeric columns are coerced with zero fallback (negatives included),
//! categorical columns are trimmed, and the four ratios are appended.

use super::performance::{performance_table, VendorPerformance};
use crate::store::{coerce_column, text_column, CoercionPolicy, Table, TableStore, WriteMode};
use crate::utils::config::{
    BASE_NUMERIC_COLUMNS, CLEANED_TABLE, COL_BRAND, COL_DESCRIPTION, COL_VENDOR_NAME,
    SUMMARY_TABLE,
};
use crate::utils::error::PipelineError;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// What the cleaning pass had to fix
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivationReport {
    pub rows: usize,

    /// Column -> number of cells replaced by 0
    pub defaulted: BTreeMap<String, usize>,

    /// Numeric columns absent from the summary table
    pub missing_columns: Vec<String>,
}

impl DerivationReport {
    pub fn total_defaulted(&self) -> usize {
        self.defaulted.values().sum()
    }
}

/// Clean a summary table and compute derived columns
///
/// Pure; does not touch the store.
pub fn derive_rows(summary: &Table) -> (Vec<VendorPerformance>, DerivationReport) {
    let mut report = DerivationReport {
        rows: summary.len(),
        ..Default::default()
    };

    let vendors = text_column(summary, COL_VENDOR_NAME);
    let brands = text_column(summary, COL_BRAND);
    let descriptions = text_column(summary, COL_DESCRIPTION);

    let mut numeric = Vec::with_capacity(BASE_NUMERIC_COLUMNS.len());
    for column in BASE_NUMERIC_COLUMNS {
        let coerced = coerce_column(summary, column, CoercionPolicy::CLEANED);
        if !coerced.present {
            report.missing_columns.push(column.to_string());
        }
        if coerced.defaulted > 0 {
            report.defaulted.insert(column.to_string(), coerced.defaulted);
        }
        numeric.push(coerced.values);
    }

    let rows = (0..summary.len())
        .map(|i| {
            let mut base = [0.0; 10];
            for (slot, column) in base.iter_mut().zip(&numeric) {
                *slot = column[i];
            }
            VendorPerformance::from_base(
                vendors[i].clone(),
                brands[i].clone(),
                descriptions[i].clone(),
                base,
            )
        })
        .collect();

    (rows, report)
}

/// Build the cleaned table from the summary table
///
/// **Public** - main entry point for the clean step
///
/// The summary table is left unchanged; the cleaned table is replaced.
///
/// # Errors
/// * `PipelineError::Store` - If the summary table is missing or the write fails
pub fn derive_metrics(store: &mut dyn TableStore) -> Result<DerivationReport, PipelineError> {
    let summary = store.read_table(SUMMARY_TABLE)?;
    info!("Cleaning {} rows from {}", summary.len(), SUMMARY_TABLE);

    let (rows, report) = derive_rows(&summary);

    for column in &report.missing_columns {
        warn!("{} has no {} column; treated as 0", SUMMARY_TABLE, column);
    }
    for (column, count) in &report.defaulted {
        info!("Defaulted {} value(s) in {} to 0", count, column);
    }

    let table = performance_table(&rows)?;
    let written = store.write_table(CLEANED_TABLE, &table, WriteMode::Replace)?;
    info!("Wrote {} rows to {}", written, CLEANED_TABLE);

    Ok(report)
}

/// Load the cleaned rows for analysis
///
/// # Errors
/// * `PipelineError::Store` - If the cleaned table is missing
pub fn load_performance(store: &dyn TableStore) -> Result<Vec<VendorPerformance>, PipelineError> {
    let table = store.read_table(CLEANED_TABLE)?;
    Ok(super::performance::rows_from_table(&table))
}
