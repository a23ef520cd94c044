//! Analytics over the cleaned vendor/brand table.
//!
//! - `stats`: descriptive statistics and Student-t inference
//! - `queries`: the business query catalog
//! - `eda`: exploratory summaries
//! - `report`: assembles everything into an `AnalysisReport`

pub mod eda;
pub mod queries;
pub mod report;
pub mod stats;

pub use queries::{GroupKey, Metric, Order, QuantityBucket, OTHERS_LABEL};
pub use report::{run_analysis, AnalysisReport};
pub use stats::Estimate;
