//! Full pipeline: ingest, summarize, clean, analyze.

use super::analyze::execute_analyze;
use super::build::{execute_clean, execute_summarize};
use super::ingest::execute_ingest;
use super::models::RunArgs;
use crate::analytics::AnalysisReport;
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

/// Execute every pipeline step in order
///
/// **Public** - main entry point for the run command
///
/// # Errors
/// The first failing step aborts the run; earlier tables stay in the store.
pub fn execute_run(args: &RunArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();
    let database = &args.ingest.database;
    let print = args.analyze.print_summary;

    if args.skip_ingest {
        info!("Step 1/4: Skipping ingestion");
    } else {
        info!("Step 1/4: Ingesting CSV files...");
        execute_ingest(&args.ingest).context("Ingestion step failed")?;
    }

    info!("Step 2/4: Building vendor summary...");
    execute_summarize(database, print).context("Summary step failed")?;

    info!("Step 3/4: Deriving metrics...");
    execute_clean(database, print).context("Cleaning step failed")?;

    info!("Step 4/4: Analyzing...");
    let report = execute_analyze(&args.analyze).context("Analysis step failed")?;

    info!(
        "Pipeline completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}
