//! SQLite-backed table store.
//!
//! Only this file talks to the database. Table names are always quoted, so
//! any CSV-derived name is safe to use.

use super::table::{Cell, Table};
use super::{TableStore, WriteMode};
use crate::utils::error::StoreError;
use log::debug;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::path::Path;

/// Table store over a single SQLite connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!("Opening store: {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    fn ensure_table(&self, name: &str) -> Result<(), StoreError> {
        if table_exists(&self.conn, name)? {
            Ok(())
        } else {
            Err(StoreError::MissingTable(name.to_string()))
        }
    }

    fn select(&self, name: &str, limit: Option<usize>) -> Result<Table, StoreError> {
        self.ensure_table(name)?;

        let sql = match limit {
            Some(limit) => format!("SELECT * FROM {} LIMIT {}", quote_ident(name), limit),
            None => format!("SELECT * FROM {}", quote_ident(name)),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                cells.push(Cell::from(row.get_ref(index)?));
            }
            table.push_row(cells)?;
        }

        debug!("Read {} rows from {}", table.len(), name);
        Ok(table)
    }
}

impl TableStore for SqliteStore {
    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        // sqlite_master rowid order is creation order
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn has_table(&self, name: &str) -> Result<bool, StoreError> {
        table_exists(&self.conn, name)
    }

    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        self.select(name, None)
    }

    fn read_head(&self, name: &str, limit: usize) -> Result<Table, StoreError> {
        self.select(name, Some(limit))
    }

    fn row_count(&self, name: &str) -> Result<u64, StoreError> {
        self.ensure_table(name)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn write_table(
        &mut self,
        name: &str,
        table: &Table,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        if table.columns().is_empty() {
            return Err(StoreError::EmptySchema(name.to_string()));
        }

        let tx = self.conn.transaction()?;

        match mode {
            WriteMode::Replace => {
                tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])?;
                tx.execute(&create_table_sql(name, table), [])?;
            }
            WriteMode::Append => {
                if table_exists(&tx, name)? {
                    let existing = column_names(&tx, name)?;
                    if existing != table.columns() {
                        return Err(StoreError::SchemaMismatch {
                            table: name.to_string(),
                            expected: existing,
                            found: table.columns().to_vec(),
                        });
                    }
                } else {
                    tx.execute(&create_table_sql(name, table), [])?;
                }
            }
        }

        let placeholders = vec!["?"; table.columns().len()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", quote_ident(name), placeholders);
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        debug!("Wrote {} rows to {} ({:?})", table.len(), name, mode);
        Ok(table.len())
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Cell::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            Cell::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(value) => Cell::Integer(value),
            ValueRef::Real(value) => Cell::Real(value),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Cell::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn column_names(conn: &Connection, name: &str) -> Result<Vec<String>, StoreError> {
    let stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 0", quote_ident(name)))?;
    let names = stmt.column_names().into_iter().map(String::from).collect();
    Ok(names)
}

/// CREATE TABLE with each column's affinity taken from its first non-null cell
fn create_table_sql(name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let affinity = table
                .column_cells(index)
                .find(|cell| !cell.is_null())
                .map(|cell| match cell {
                    Cell::Integer(_) => " INTEGER",
                    Cell::Real(_) => " REAL",
                    _ => " TEXT",
                })
                .unwrap_or("");
            format!("{}{}", quote_ident(column), affinity)
        })
        .collect();

    format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", "))
}
