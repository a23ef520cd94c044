//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Applies the consistency gate to the cleaned table
//! 2. Loads the cleaned rows
//! 3. Runs the query catalog
//! 4. Writes the JSON report
//! 5. Renders charts

use super::models::AnalyzeArgs;
use super::utils::open_store;
use crate::analytics::{run_analysis, AnalysisReport};
use crate::checker::profile_table;
use crate::metrics::rows_from_table;
use crate::output::terminal::render_terminal_report;
use crate::output::{report_charts, write_report, RenderSink, SvgSink};
use crate::store::TableStore;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs and the run command
///
/// # Errors
/// * Missing cleaned table
/// * Consistency gate failure
/// * Report write errors
///
/// Chart failures are logged and do not fail the command.
pub fn execute_analyze(args: &AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();
    info!("Analyzing {} in {}", args.table, args.database.display());
    let store = open_store(&args.database)?;

    // Step 1: Gate
    info!("Step 1/5: Checking data quality...");
    let table = store
        .read_table(&args.table)
        .with_context(|| format!("Failed to read table {}", args.table))?;
    let consistency = profile_table(&args.table, &table);
    consistency
        .gate()
        .context("Cleaned table failed the consistency gate")?;
    debug!(
        "{} rows, {} columns, {} missing values",
        consistency.rows,
        consistency.columns.len(),
        consistency.total_nulls()
    );

    // Step 2: Load rows
    info!("Step 2/5: Loading cleaned rows...");
    let rows = rows_from_table(&table);

    // Step 3: Queries
    info!("Step 3/5: Running queries...");
    let report = run_analysis(&rows, &args.analysis, &args.table);

    // Step 4: JSON report
    if let Some(path) = &args.output_json {
        info!("Step 4/5: Writing report...");
        write_report(&report, path).context("Failed to write analysis report")?;
        info!("✓ Report written to: {}", path.display());
    } else {
        info!("Step 4/5: Skipping report file (not requested)");
    }

    // Step 5: Charts
    if let Some(dir) = &args.charts_dir {
        info!("Step 5/5: Rendering charts...");
        let mut sink = SvgSink::new(dir, args.chart_width);
        render_all(&mut sink, &report, args.analysis.top_n);
        info!("✓ {} charts written to: {}", sink.written().len(), dir.display());
    } else {
        info!("Step 5/5: Skipping charts (not requested)");
    }

    if args.print_summary {
        println!("{}", render_terminal_report(&report, args.head));
    }

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Hand every chart to the sink, logging failures
///
/// **Public** - lets callers supply their own sink
pub fn render_all(sink: &mut dyn RenderSink, report: &AnalysisReport, top_n: usize) {
    for (name, chart) in report_charts(report, top_n) {
        if let Err(e) = sink.render(&name, &chart) {
            warn!("Failed to render chart {}: {}", name, e);
        }
    }
}

/// Validate analyze arguments, including that the database exists
///
/// **Public** - called before execute_analyze
pub fn validate_analyze_args(args: &AnalyzeArgs) -> Result<()> {
    validate_analysis_options(args)?;

    if !args.database.is_file() {
        anyhow::bail!("Database not found: {}", args.database.display());
    }

    Ok(())
}

/// Validate the table name, thresholds and chart width
///
/// **Public** - the run command calls this before ingestion creates the database
pub fn validate_analysis_options(args: &AnalyzeArgs) -> Result<()> {
    if args.table.is_empty() {
        anyhow::bail!("Table name cannot be empty");
    }

    if args.analysis.top_n == 0 {
        anyhow::bail!("top_n must be greater than 0");
    }

    if !(args.analysis.confidence > 0.0 && args.analysis.confidence < 1.0) {
        anyhow::bail!("confidence must be between 0 and 1");
    }

    if !(args.analysis.alpha > 0.0 && args.analysis.alpha < 1.0) {
        anyhow::bail!("alpha must be between 0 and 1");
    }

    if args.chart_width < 200 {
        anyhow::bail!("chart width is too small (min 200)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Chart;
    use crate::utils::config::AnalysisConfig;
    use crate::utils::error::OutputError;

    struct FailingSink {
        attempts: usize,
    }

    impl RenderSink for FailingSink {
        fn render(&mut self, _name: &str, _chart: &Chart) -> Result<(), OutputError> {
            self.attempts += 1;
            Err(OutputError::InvalidPath("read-only".to_string()))
        }
    }

    #[test]
    fn test_render_all_keeps_going_after_failures() {
        let report = run_analysis(&[], &AnalysisConfig::default(), "cleaned");
        let mut sink = FailingSink { attempts: 0 };

        render_all(&mut sink, &report, 10);

        assert_eq!(sink.attempts, report_charts(&report, 10).len());
    }

    #[test]
    fn test_validate_missing_database() {
        let args = AnalyzeArgs {
            database: "/nonexistent/inventory.db".into(),
            ..AnalyzeArgs::default()
        };
        assert!(validate_analyze_args(&args).is_err());
    }

    #[test]
    fn test_options_ignore_missing_database() {
        let args = AnalyzeArgs {
            database: "/nonexistent/inventory.db".into(),
            ..AnalyzeArgs::default()
        };
        assert!(validate_analysis_options(&args).is_ok());
    }

    #[test]
    fn test_options_reject_narrow_charts() {
        let args = AnalyzeArgs {
            chart_width: 10,
            ..AnalyzeArgs::default()
        };
        assert!(validate_analysis_options(&args).is_err());
    }

    #[test]
    fn test_validate_bad_alpha() {
        let mut args = AnalyzeArgs::default();
        args.analysis.alpha = 0.0;
        assert!(validate_analyze_args(&args).is_err());
    }
}
