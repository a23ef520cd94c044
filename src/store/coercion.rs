//! Column-wise numeric and text coercion.
//!
//! Values that cannot be read as numbers are replaced by the policy default
//! instead of failing the row. Every replacement is counted so the caller
//! can report how much of a column was defaulted.

use super::table::{Cell, Table};
use log::warn;

/// How a cell is turned into a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoercionPolicy {
    /// Value used when parsing fails
    pub default: f64,

    /// Treat negative numbers as failures
    pub reject_negative: bool,
}

impl CoercionPolicy {
    /// Raw source rows: any finite number, zero otherwise
    pub const RAW: Self = Self {
        default: 0.0,
        reject_negative: false,
    };

    /// Cleaned summary columns: non-negative finite numbers, zero otherwise
    pub const CLEANED: Self = Self {
        default: 0.0,
        reject_negative: true,
    };

    pub fn apply(&self, cell: &Cell) -> Coerced {
        match parse_number(cell) {
            Some(value) if !(self.reject_negative && value < 0.0) => Coerced::Parsed(value),
            _ => Coerced::Defaulted(self.default),
        }
    }
}

/// Outcome of coercing one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Parsed(f64),
    Defaulted(f64),
}

impl Coerced {
    pub fn value(self) -> f64 {
        match self {
            Coerced::Parsed(value) | Coerced::Defaulted(value) => value,
        }
    }

    pub fn was_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted(_))
    }
}

/// Read a cell as a finite number
pub fn parse_number(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Null => return None,
        Cell::Integer(value) => *value as f64,
        Cell::Real(value) => *value,
        Cell::Text(text) => text.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// A numeric column after coercion
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub values: Vec<f64>,

    /// Number of cells replaced by the default
    pub defaulted: usize,

    /// Whether the column existed in the source table
    pub present: bool,
}

/// Coerce a whole column
///
/// A missing column yields one default per row, all counted as defaulted.
pub fn coerce_column(table: &Table, column: &str, policy: CoercionPolicy) -> NumericColumn {
    let Some(index) = table.column_index(column) else {
        warn!("Column {} missing, filling {} rows with {}", column, table.len(), policy.default);
        return NumericColumn {
            values: vec![policy.default; table.len()],
            defaulted: table.len(),
            present: false,
        };
    };

    let mut defaulted = 0;
    let values = table
        .column_cells(index)
        .map(|cell| {
            let coerced = policy.apply(cell);
            if coerced.was_defaulted() {
                defaulted += 1;
            }
            coerced.value()
        })
        .collect();

    NumericColumn {
        values,
        defaulted,
        present: true,
    }
}

/// Coerce a column to trimmed text; nulls and missing columns become ""
pub fn text_column(table: &Table, column: &str) -> Vec<String> {
    match table.column_index(column) {
        Some(index) => table
            .column_cells(index)
            .map(|cell| cell.as_text().map(|t| t.trim().to_string()).unwrap_or_default())
            .collect(),
        None => {
            warn!("Column {} missing, filling with empty text", column);
            vec![String::new(); table.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(cells: Vec<Cell>) -> Table {
        let mut table = Table::with_columns(&["v"]);
        for cell in cells {
            table.push_row(vec![cell]).unwrap();
        }
        table
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&Cell::Integer(3)), Some(3.0));
        assert_eq!(parse_number(&Cell::Text(" 2.5 ".to_string())), Some(2.5));
        assert_eq!(parse_number(&Cell::Text("abc".to_string())), None);
        assert_eq!(parse_number(&Cell::Real(f64::NAN)), None);
        assert_eq!(parse_number(&Cell::Null), None);
    }

    #[test]
    fn test_raw_policy_keeps_negatives() {
        assert_eq!(CoercionPolicy::RAW.apply(&Cell::Real(-4.0)), Coerced::Parsed(-4.0));
        assert_eq!(CoercionPolicy::CLEANED.apply(&Cell::Real(-4.0)), Coerced::Defaulted(0.0));
    }

    #[test]
    fn test_coerce_column_counts_defaults() {
        let table = table_of(vec![
            Cell::Integer(10),
            Cell::Text("oops".to_string()),
            Cell::Null,
            Cell::Text("7.5".to_string()),
        ]);

        let column = coerce_column(&table, "v", CoercionPolicy::CLEANED);

        assert_eq!(column.values, vec![10.0, 0.0, 0.0, 7.5]);
        assert_eq!(column.defaulted, 2);
        assert!(column.present);
    }

    #[test]
    fn test_coerce_missing_column() {
        let table = table_of(vec![Cell::Integer(1), Cell::Integer(2)]);
        let column = coerce_column(&table, "absent", CoercionPolicy::CLEANED);

        assert_eq!(column.values, vec![0.0, 0.0]);
        assert_eq!(column.defaulted, 2);
        assert!(!column.present);
    }

    #[test]
    fn test_text_column_trims() {
        let table = table_of(vec![Cell::Text("  A  ".to_string()), Cell::Null, Cell::Integer(5)]);
        assert_eq!(text_column(&table, "v"), vec!["A", "", "5"]);
    }
}
