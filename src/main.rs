//! Vendor Perf CLI
//!
//! Loads purchase, sales, pricing and invoice CSV files into SQLite,
//! builds per vendor/brand summaries, derives performance ratios and
//! writes an analysis report with charts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use std::path::PathBuf;

use vendor_perf::commands::{
    display_version, execute_analyze, execute_check, execute_clean, execute_ingest, execute_run,
    execute_summarize, execute_tables, validate_analysis_options, validate_analyze_args,
    validate_ingest_args,
    validate_report_file, AnalyzeArgs, IngestArgs, RunArgs, TablesArgs,
};
use vendor_perf::utils::config::{load_config, PipelineConfig, CLEANED_TABLE};
use vendor_perf::utils::logging::init_logging;

/// Vendor Perf - vendor performance analytics
#[derive(Parser, Debug)]
#[command(name = "vendor-perf")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true, env = "VENDOR_PERF_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the CSV files into the database
    Ingest {
        #[command(flatten)]
        load: LoadOptions,

        /// Print a per-table summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Build the vendor/brand summary table
    Summarize {
        /// Print a text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Derive ratios and write the cleaned table
    Clean {
        /// Print a text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Report column types and missing values for a table
    Check {
        /// Table to check
        #[arg(short, long, default_value = CLEANED_TABLE)]
        table: String,
    },

    /// List tables with their first rows
    Tables {
        /// Rows shown per table (0 for the inventory only)
        #[arg(long, default_value = "5")]
        head: usize,
    },

    /// Run the analysis queries on the cleaned table
    Analyze {
        /// Table holding the cleaned rows
        #[arg(short, long, default_value = CLEANED_TABLE)]
        table: String,

        #[command(flatten)]
        report: ReportOptions,
    },

    /// Run ingest, summarize, clean and analyze in order
    Run {
        #[command(flatten)]
        load: LoadOptions,

        /// Reuse the tables already in the database
        #[arg(long, conflicts_with = "fresh")]
        skip_ingest: bool,

        #[command(flatten)]
        report: ReportOptions,
    },

    /// Validate an analysis report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

/// Options shared by ingest and run
#[derive(Args, Debug)]
struct LoadOptions {
    /// Directory holding the CSV files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Rows per ingestion chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Delete the database before loading
    #[arg(long)]
    fresh: bool,
}

/// Options shared by analyze and run
#[derive(Args, Debug)]
struct ReportOptions {
    /// Output path for the JSON report
    #[arg(short, long, default_value = "artifacts/report.json")]
    output: PathBuf,

    /// Directory for SVG charts
    #[arg(long, default_missing_value = "artifacts/charts", num_args = 0..=1)]
    charts: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Groups kept by each top-N query
    #[arg(long)]
    top_n: Option<usize>,

    /// Print the report to stdout
    #[arg(long)]
    summary: bool,

    /// Rows shown per query in the printed report
    #[arg(long, default_value = "5")]
    head: usize,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    init_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to initialize logging")?;

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(database) = cli.database {
        config.database = database;
    }
    debug!("Configuration: {:?}", config);

    // Execute command
    match cli.command {
        Commands::Ingest { load, summary } => {
            let mut args = ingest_args(&config, load);
            args.print_summary = summary;

            validate_ingest_args(&args)?;
            execute_ingest(&args)?;
        }

        Commands::Summarize { summary } => {
            execute_summarize(&config.database, summary)?;
        }

        Commands::Clean { summary } => {
            execute_clean(&config.database, summary)?;
        }

        Commands::Check { table } => {
            execute_check(&config.database, &table)?;
        }

        Commands::Tables { head } => {
            execute_tables(&TablesArgs {
                database: config.database.clone(),
                head,
            })?;
        }

        Commands::Analyze { table, report } => {
            let mut args = analyze_args(&config, report)?;
            args.table = table;

            validate_analyze_args(&args)?;
            execute_analyze(&args)?;
        }

        Commands::Run {
            load,
            skip_ingest,
            report,
        } => {
            let args = RunArgs {
                ingest: ingest_args(&config, load),
                analyze: analyze_args(&config, report)?,
                skip_ingest,
            };

            validate_analysis_options(&args.analyze)?;
            if !skip_ingest {
                validate_ingest_args(&args.ingest)?;
            }
            execute_run(&args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Merge load options over the configuration
///
/// **Private** - CLI flags win over config values
fn ingest_args(config: &PipelineConfig, load: LoadOptions) -> IngestArgs {
    let mut args = IngestArgs::from_config(config);
    if let Some(data_dir) = load.data_dir {
        args.data_dir = data_dir;
    }
    if let Some(chunk_size) = load.chunk_size {
        args.chunk_size = chunk_size;
    }
    args.fresh = load.fresh;
    args
}

/// Merge report options over the configuration
///
/// **Private** - CLI flags win over config values
fn analyze_args(config: &PipelineConfig, report: ReportOptions) -> Result<AnalyzeArgs> {
    let mut args = AnalyzeArgs::from_config(config);
    args.output_json = Some(report.output);
    if report.charts.is_some() {
        args.charts_dir = report.charts;
    }
    if let Some(width) = report.width {
        args.chart_width = width;
    }
    if let Some(top_n) = report.top_n {
        if top_n == 0 {
            anyhow::bail!("--top-n must be greater than 0");
        }
        args.analysis.top_n = top_n;
    }
    args.print_summary = report.summary;
    args.head = report.head;
    Ok(args)
}
