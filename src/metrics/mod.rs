//! Metric deriver: cleaned summary rows with profitability ratios.

pub mod deriver;
pub mod performance;

pub use deriver::{derive_metrics, derive_rows, load_performance, DerivationReport};
pub use performance::{performance_table, ratio_or_zero, rows_from_table, VendorPerformance};
