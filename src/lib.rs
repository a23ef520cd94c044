//! Vendor Perf
//!
//! Vendor performance analytics over purchase, sales, pricing and
//! invoice data.
//!
//! This crate provides the core implementation for the
//! `vendor-perf` CLI tool:
//!
//! - `ingest`: chunked CSV loading into the table store
//! - `summary`: one row per vendor/brand pair
//! - `metrics`: cleaning and derived ratios
//! - `checker`: column types, missing values, and the analysis gate
//! - `analytics`: the query catalog and statistical tests
//! - `output`: JSON report, SVG charts, terminal summaries
//!
//! ## Getting Started
//!
//! ```bash
//! vendor-perf run --data-dir data/csv_files --charts --summary
//! vendor-perf tables --head 5
//! ```

pub mod analytics;
pub mod checker;
pub mod commands;
pub mod ingest;
pub mod metrics;
pub mod output;
pub mod store;
pub mod summary;
pub mod utils;
