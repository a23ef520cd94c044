//! In-memory table representation shared by every pipeline stage.
//!
//! Cells are dynamically typed the way SQLite stores them, so a table can
//! hold raw CSV data before any cleaning has happened.

use crate::utils::error::StoreError;
use std::fmt;

/// A single stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell from a raw CSV field
    ///
    /// Empty fields are null, integer and float literals become numbers,
    /// everything else is kept verbatim as text.
    pub fn infer(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Cell::Integer(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Real(value),
            _ => Cell::Text(field.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render the cell as text, `None` for null
    ///
    /// Whole-valued reals print without a fractional part so that a brand id
    /// stored as `58.0` keys the same as `58`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(value) => Some(value.to_string()),
            Cell::Real(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Some((*value as i64).to_string())
            }
            Cell::Real(value) => Some(value.to_string()),
            Cell::Text(value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Real(value) => write!(f, "{}", value),
            Cell::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Real(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Ordered columns plus rows of cells
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, rejecting rows of the wrong width
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), StoreError> {
        if row.len() != self.columns.len() {
            return Err(StoreError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the first alias that names a column
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.column_index(alias))
    }

    /// Cells of one column, top to bottom
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// First `n` rows with the same columns
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cells() {
        assert_eq!(Cell::infer(""), Cell::Null);
        assert_eq!(Cell::infer("   "), Cell::Null);
        assert_eq!(Cell::infer("42"), Cell::Integer(42));
        assert_eq!(Cell::infer(" 3.5 "), Cell::Real(3.5));
        assert_eq!(Cell::infer("DIAGEO  "), Cell::Text("DIAGEO  ".to_string()));
        assert_eq!(Cell::infer("NaN"), Cell::Text("NaN".to_string()));
    }

    #[test]
    fn test_as_text_whole_reals() {
        assert_eq!(Cell::Real(58.0).as_text(), Some("58".to_string()));
        assert_eq!(Cell::Real(1.25).as_text(), Some("1.25".to_string()));
        assert_eq!(Cell::Integer(7).as_text(), Some("7".to_string()));
        assert_eq!(Cell::Null.as_text(), None);
    }

    #[test]
    fn test_push_row_width_checked() {
        let mut table = Table::with_columns(&["a", "b"]);
        assert!(table.push_row(vec![Cell::Integer(1), Cell::Null]).is_ok());
        assert!(matches!(
            table.push_row(vec![Cell::Integer(1)]),
            Err(StoreError::RowWidth { expected: 2, found: 1 })
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_find_column_aliases() {
        let table = Table::with_columns(&["VendorNo", "SalesQuantity"]);
        assert_eq!(table.find_column(&["Quantity", "SalesQuantity"]), Some(1));
        assert_eq!(table.find_column(&["Missing"]), None);
    }

    #[test]
    fn test_head() {
        let mut table = Table::with_columns(&["x"]);
        for i in 0..5 {
            table.push_row(vec![Cell::Integer(i)]).unwrap();
        }
        let head = table.head(3);
        assert_eq!(head.len(), 3);
        assert_eq!(head.columns(), table.columns());
    }
}
