//! Chunked CSV loader.
//!
//! Files are read in fixed-size chunks: the first chunk replaces the target
//! table, later chunks are appended. This keeps memory bounded by the chunk
//! size rather than by the file size.

use crate::store::{Cell, Table, TableStore, WriteMode};
use crate::utils::config::SourceFile;
use crate::utils::error::IngestError;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

/// Result of loading one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub table: String,
    pub rows: usize,
    pub chunks: usize,
}

/// Load a headered CSV file into `table`
///
/// **Public** - used by the ingest command and tests
///
/// # Arguments
/// * `store` - Target store
/// * `path` - CSV file
/// * `table` - Table name, replaced by this load
/// * `chunk_size` - Rows per write
///
/// # Errors
/// * `IngestError::MissingSource` - If the file does not exist
/// * `IngestError::Csv` - If a record cannot be read
/// * `IngestError::Store` - If a write fails
pub fn ingest_csv(
    store: &mut dyn TableStore,
    path: &Path,
    table: &str,
    chunk_size: usize,
) -> Result<IngestSummary, IngestError> {
    if chunk_size == 0 {
        return Err(IngestError::InvalidChunkSize);
    }
    if !path.is_file() {
        return Err(IngestError::MissingSource(path.to_path_buf()));
    }

    debug!("Reading {} into {}", path.display(), table);
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut summary = IngestSummary {
        table: table.to_string(),
        rows: 0,
        chunks: 0,
    };
    let mut chunk = Table::new(columns.clone());
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        chunk.push_row(record.iter().map(Cell::infer).collect())?;
        if chunk.len() >= chunk_size {
            let full = std::mem::replace(&mut chunk, Table::new(columns.clone()));
            write_chunk(store, table, &full, &mut summary)?;
        }
    }

    // The trailing chunk, or the empty table for a header-only file
    if !chunk.is_empty() || summary.chunks == 0 {
        write_chunk(store, table, &chunk, &mut summary)?;
    }

    Ok(summary)
}

fn write_chunk(
    store: &mut dyn TableStore,
    table: &str,
    chunk: &Table,
    summary: &mut IngestSummary,
) -> Result<(), IngestError> {
    let mode = if summary.chunks == 0 {
        WriteMode::Replace
    } else {
        WriteMode::Append
    };
    let written = store.write_table(table, chunk, mode)?;
    summary.rows += written;
    summary.chunks += 1;
    info!("Inserted {} rows into {}", written, table);
    Ok(())
}

/// Load every configured source file from `data_dir`
///
/// Stops at the first failure; tables already loaded stay in the store.
pub fn ingest_all(
    store: &mut dyn TableStore,
    data_dir: &Path,
    sources: &[SourceFile],
    chunk_size: usize,
) -> Result<Vec<IngestSummary>, IngestError> {
    let mut summaries = Vec::with_capacity(sources.len());
    for source in sources {
        let path = data_dir.join(&source.file);
        let summary = ingest_csv(store, &path, &source.table, chunk_size)?;
        info!(
            "Loaded {} ({} rows, {} chunks)",
            source.file, summary.rows, summary.chunks
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_ingest_in_chunks() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "Brand,Qty\n1,10\n2,20\n3,30\n4,40\n5,50\n");
        let mut store = SqliteStore::in_memory().unwrap();

        let summary = ingest_csv(&mut store, &path, "purchases", 2).unwrap();

        assert_eq!(summary.rows, 5);
        assert_eq!(summary.chunks, 3);
        assert_eq!(store.row_count("purchases").unwrap(), 5);
    }

    #[test]
    fn test_reingest_replaces() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "Brand,Qty\n1,10\n2,20\n");
        let mut store = SqliteStore::in_memory().unwrap();

        ingest_csv(&mut store, &path, "purchases", 1).unwrap();
        ingest_csv(&mut store, &path, "purchases", 1).unwrap();

        assert_eq!(store.row_count("purchases").unwrap(), 2);
    }

    #[test]
    fn test_header_only_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "e.csv", "Brand,Qty\n");
        let mut store = SqliteStore::in_memory().unwrap();

        let summary = ingest_csv(&mut store, &path, "empty", 10).unwrap();

        assert_eq!(summary.rows, 0);
        assert_eq!(summary.chunks, 1);
        let table = store.read_table("empty").unwrap();
        assert_eq!(table.columns(), &["Brand".to_string(), "Qty".to_string()]);
    }

    #[test]
    fn test_missing_source() {
        let mut store = SqliteStore::in_memory().unwrap();
        let result = ingest_csv(&mut store, Path::new("/nonexistent.csv"), "t", 10);
        assert!(matches!(result, Err(IngestError::MissingSource(_))));
    }

    #[test]
    fn test_zero_chunk_size() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "a\n1\n");
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            ingest_csv(&mut store, &path, "t", 0),
            Err(IngestError::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_cells_are_inferred() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "Name,Qty,Price\nGin,3,12.5\n,,\n");
        let mut store = SqliteStore::in_memory().unwrap();

        ingest_csv(&mut store, &path, "t", 10).unwrap();
        let table = store.read_table("t").unwrap();

        assert_eq!(
            table.rows()[0],
            vec![Cell::from("Gin"), Cell::Integer(3), Cell::Real(12.5)]
        );
        assert_eq!(table.rows()[1], vec![Cell::Null, Cell::Null, Cell::Null]);
    }
}
