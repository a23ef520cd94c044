//! Summary builder: raw purchase/sales rows to one row per vendor and brand.

pub mod builder;
pub mod records;

pub use builder::{build_summary, summarize, summary_table, SummaryReport, VendorBrandSummary};
pub use records::{PriceQuote, RawRecord, RecordSource};
