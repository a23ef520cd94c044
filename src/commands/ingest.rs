//! Ingest command implementation.
//!
//! Loads every configured CSV file into the store, one table per file.

use super::models::IngestArgs;
use super::utils::open_store;
use crate::ingest::{ingest_all, IngestSummary};
use crate::output::terminal::render_terminal_ingest;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::time::Instant;

/// Execute the ingest command
///
/// **Public** - main entry point called from main.rs and the run command
///
/// # Errors
/// * Missing source files or data directory
/// * CSV parse errors
/// * Database errors
pub fn execute_ingest(args: &IngestArgs) -> Result<Vec<IngestSummary>> {
    let start_time = Instant::now();
    info!(
        "Ingesting {} files from {} into {}",
        args.sources.len(),
        args.data_dir.display(),
        args.database.display()
    );

    if args.fresh && args.database.exists() {
        warn!("Removing existing database: {}", args.database.display());
        fs::remove_file(&args.database)
            .with_context(|| format!("Failed to remove {}", args.database.display()))?;
    }

    let mut store = open_store(&args.database)?;
    let summaries = ingest_all(&mut store, &args.data_dir, &args.sources, args.chunk_size)
        .context("Failed to ingest CSV files")?;

    if args.print_summary {
        println!("{}", render_terminal_ingest(&summaries));
    }

    let total: usize = summaries.iter().map(|s| s.rows).sum();
    info!(
        "Ingestion completed: {} rows in {:.2}s",
        total,
        start_time.elapsed().as_secs_f64()
    );
    Ok(summaries)
}

/// Validate ingest arguments
///
/// **Public** - called before execute_ingest
pub fn validate_ingest_args(args: &IngestArgs) -> Result<()> {
    if args.chunk_size == 0 {
        anyhow::bail!("chunk_size must be greater than 0");
    }

    if args.sources.is_empty() {
        anyhow::bail!("No source files configured");
    }

    if !args.data_dir.is_dir() {
        anyhow::bail!("Data directory not found: {}", args.data_dir.display());
    }

    if args.database.is_dir() {
        anyhow::bail!("Database path is a directory: {}", args.database.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_zero_chunk_size() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = IngestArgs {
            data_dir: temp_dir.path().to_path_buf(),
            chunk_size: 0,
            ..IngestArgs::default()
        };
        assert!(validate_ingest_args(&args).is_err());
    }

    #[test]
    fn test_validate_missing_data_dir() {
        let args = IngestArgs {
            data_dir: "/nonexistent/data".into(),
            ..IngestArgs::default()
        };
        assert!(validate_ingest_args(&args).is_err());
    }

    #[test]
    fn test_validate_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = IngestArgs {
            data_dir: temp_dir.path().to_path_buf(),
            database: temp_dir.path().join("inventory.db"),
            ..IngestArgs::default()
        };
        assert!(validate_ingest_args(&args).is_ok());
    }
}
