use crate::output::read_report;
use crate::store::SqliteStore;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Open the SQLite store with command-level context
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    if report.version != SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported report version {} (expected {})",
            report.version,
            SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Source Table: {}", report.source_table);
    println!("  Rows: {}", report.row_count);
    println!("  Top Brands: {}", report.top_brands_by_sales.len());
    println!("  Unsold Vendors: {}", report.unsold_inventory.len());

    let undefined = report.undefined_entries();
    if !undefined.is_empty() {
        println!("  Undefined Statistics: {}", undefined.len());
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Vendor Perf v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Vendor performance analytics over purchase, sales and invoice data.");
}
