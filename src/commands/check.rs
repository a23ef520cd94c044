//! Check and tables command implementations.
//!
//! Both are read-only views of the store.

use super::models::TablesArgs;
use super::utils::open_store;
use crate::checker::{check_table, inventory, ConsistencyReport};
use crate::output::terminal::{
    render_table_head, render_terminal_consistency, render_terminal_inventory,
};
use crate::store::TableStore;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Profile a table and apply the analysis gate
///
/// **Public** - called from main.rs
///
/// Prints the column report before applying the gate.
pub fn execute_check(database: &Path, table: &str) -> Result<ConsistencyReport> {
    info!("Checking table {} in {}", table, database.display());
    let store = open_store(database)?;

    let report =
        check_table(&store, table).with_context(|| format!("Failed to read table {}", table))?;
    println!("{}", render_terminal_consistency(&report));

    report.gate().context("Consistency gate failed")?;
    Ok(report)
}

/// List every table, optionally with its first rows
///
/// **Public** - called from main.rs
pub fn execute_tables(args: &TablesArgs) -> Result<()> {
    let store = open_store(&args.database)?;

    let tables = inventory(&store).context("Failed to list tables")?;
    println!("{}", render_terminal_inventory(&tables));

    if args.head > 0 {
        for table in &tables {
            let head = store
                .read_head(&table.name, args.head)
                .with_context(|| format!("Failed to read table {}", table.name))?;
            print!("{}", render_table_head(&table.name, &head));
        }
    }

    Ok(())
}
