//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod build;
pub mod check;
pub mod ingest;
pub mod models;
pub mod run;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, render_all, validate_analysis_options, validate_analyze_args};
pub use build::{execute_clean, execute_summarize};
pub use check::{execute_check, execute_tables};
pub use ingest::{execute_ingest, validate_ingest_args};
pub use models::{AnalyzeArgs, IngestArgs, RunArgs, TablesArgs};
pub use run::execute_run;
pub use utils::{display_version, validate_report_file};
