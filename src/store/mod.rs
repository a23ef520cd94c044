//! Named tables behind a small repository trait.
//!
//! Every pipeline stage takes a `&dyn TableStore` (or `&mut` for writers),
//! so stages can be tested against an in-memory database.

pub mod coercion;
pub mod sqlite;
pub mod table;

use crate::utils::error::StoreError;

pub use coercion::{coerce_column, parse_number, text_column, CoercionPolicy, NumericColumn};
pub use sqlite::SqliteStore;
pub use table::{Cell, Table};

/// How a write treats an existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop any existing table, then write
    Replace,

    /// Add rows to the existing table (created if absent)
    Append,
}

/// Repository over named tables
pub trait TableStore {
    /// Table names in creation order
    fn table_names(&self) -> Result<Vec<String>, StoreError>;

    fn has_table(&self, name: &str) -> Result<bool, StoreError>;

    /// Read a whole table
    ///
    /// # Errors
    /// * `StoreError::MissingTable` - If no table has that name
    fn read_table(&self, name: &str) -> Result<Table, StoreError>;

    /// Read at most `limit` rows
    fn read_head(&self, name: &str, limit: usize) -> Result<Table, StoreError>;

    fn row_count(&self, name: &str) -> Result<u64, StoreError>;

    /// Write a table, returning the number of rows written
    fn write_table(&mut self, name: &str, table: &Table, mode: WriteMode)
        -> Result<usize, StoreError>;
}
