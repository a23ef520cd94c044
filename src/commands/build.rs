//! Summarize and clean command implementations.

use super::utils::open_store;
use crate::metrics::{derive_metrics, DerivationReport};
use crate::output::terminal::{render_terminal_derivation, render_terminal_summary};
use crate::summary::{build_summary, SummaryReport};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Rebuild the vendor/brand summary table from the raw tables
///
/// **Public** - called from main.rs and the run command
pub fn execute_summarize(database: &Path, print_summary: bool) -> Result<SummaryReport> {
    info!("Building vendor summary in {}", database.display());
    let mut store = open_store(database)?;

    let report = build_summary(&mut store).context("Failed to build vendor summary")?;

    if print_summary {
        print!("{}", render_terminal_summary(&report));
    }
    Ok(report)
}

/// Derive the ratio columns and write the cleaned table
///
/// **Public** - called from main.rs and the run command
pub fn execute_clean(database: &Path, print_summary: bool) -> Result<DerivationReport> {
    info!("Deriving metrics in {}", database.display());
    let mut store = open_store(database)?;

    let report = derive_metrics(&mut store).context("Failed to derive vendor metrics")?;

    if print_summary {
        print!("{}", render_terminal_derivation(&report));
    }
    Ok(report)
}
