//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the table store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    MissingTable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Table {0} has no columns")]
    EmptySchema(String),

    #[error("Row has {found} cells but table has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("Cannot append to {table}: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Errors that can occur while loading CSV files
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chunk size must be greater than 0")]
    InvalidChunkSize,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the summary builder and metric deriver
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Table {table} has no {column} column")]
    MissingColumn { table: String, column: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the consistency gate
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Data quality check failed for {table}: {}", .problems.join("; "))]
    DataQuality { table: String, problems: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the statistical queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Statistic undefined: {0}")]
    StatisticalUndefined(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
