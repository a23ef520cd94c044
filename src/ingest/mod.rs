//! CSV ingestion into the table store.

pub mod csv_loader;

pub use csv_loader::{ingest_all, ingest_csv, IngestSummary};
