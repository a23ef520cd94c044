use crate::utils::config::{
    AnalysisConfig, PipelineConfig, SourceFile, CLEANED_TABLE, DEFAULT_DATABASE,
};
use std::path::PathBuf;

/// Arguments for the ingest command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct IngestArgs {
    /// SQLite database file
    pub database: PathBuf,

    /// Directory holding the CSV files
    pub data_dir: PathBuf,

    /// CSV file -> table mapping
    pub sources: Vec<SourceFile>,

    /// Rows per chunk
    pub chunk_size: usize,

    /// Delete the database file before loading
    pub fresh: bool,

    /// Print a per-table summary to stdout
    pub print_summary: bool,
}

impl Default for IngestArgs {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl IngestArgs {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            database: config.database.clone(),
            data_dir: config.data_dir.clone(),
            sources: config.sources.clone(),
            chunk_size: config.chunk_size,
            fresh: false,
            print_summary: false,
        }
    }
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs and the run command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// SQLite database file
    pub database: PathBuf,

    /// Table holding the cleaned rows
    pub table: String,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Directory for SVG charts (optional)
    pub charts_dir: Option<PathBuf>,

    /// Chart width in pixels
    pub chart_width: usize,

    pub analysis: AnalysisConfig,

    /// Print the report to stdout
    pub print_summary: bool,

    /// Rows shown per query in the terminal report
    pub head: usize,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl AnalyzeArgs {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            database: config.database.clone(),
            table: CLEANED_TABLE.to_string(),
            output_json: Some(PathBuf::from("artifacts/report.json")),
            charts_dir: config.charts.dir.clone(),
            chart_width: config.charts.width,
            analysis: config.analysis.clone(),
            print_summary: false,
            head: 5,
        }
    }
}

/// Arguments for the tables command
#[derive(Debug, Clone)]
pub struct TablesArgs {
    pub database: PathBuf,

    /// Rows printed per table (0 prints the inventory only)
    pub head: usize,
}

impl Default for TablesArgs {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            head: 5,
        }
    }
}

/// Arguments for the full pipeline
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub ingest: IngestArgs,
    pub analyze: AnalyzeArgs,

    /// Skip ingestion and rebuild from the tables already loaded
    pub skip_ingest: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            ingest: IngestArgs::default(),
            analyze: AnalyzeArgs::default(),
            skip_ingest: false,
        }
    }
}
