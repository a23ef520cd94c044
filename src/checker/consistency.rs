//! Column type and missing-value report with an analysis gate.

use crate::store::{Cell, Table, TableStore};
use crate::utils::config::{DERIVED_COLUMNS, RATIO_INPUT_COLUMNS};
use crate::utils::error::CheckError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type inferred from the non-null cells of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Text alongside numbers
    Mixed,
    /// No non-null cells
    Empty,
}

impl ColumnType {
    fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Null => None,
            Cell::Integer(_) => Some(ColumnType::Integer),
            Cell::Real(_) => Some(ColumnType::Real),
            Cell::Text(_) => Some(ColumnType::Text),
        }
    }

    /// Combine two observed types; integers widen to reals
    fn merge(self, other: Self) -> Self {
        use ColumnType::*;
        match (self, other) {
            (Empty, t) | (t, Empty) => t,
            (a, b) if a == b => a,
            (Integer, Real) | (Real, Integer) => Real,
            _ => Mixed,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Mixed => "mixed",
            ColumnType::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// Profile of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: ColumnType,
    pub null_count: usize,
    pub non_null_count: usize,
}

/// Per-column profile of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
}

impl ConsistencyReport {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    /// Problems that make the ratio inputs or the derived metrics unusable
    ///
    /// A table the metric deriver never processed lacks the derived columns
    /// and fails here.
    pub fn gate_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for name in RATIO_INPUT_COLUMNS.iter().chain(DERIVED_COLUMNS) {
            match self.column(name) {
                None => problems.push(format!("{} is missing", name)),
                Some(profile) => {
                    if profile.null_count > 0 {
                        problems.push(format!("{} has {} missing value(s)", name, profile.null_count));
                    }
                    if !profile.inferred_type.is_numeric() && profile.inferred_type != ColumnType::Empty {
                        problems.push(format!("{} is {}, expected numeric", name, profile.inferred_type));
                    }
                }
            }
        }
        problems
    }

    /// Fail when the ratio inputs or derived metrics are unusable
    ///
    /// # Errors
    /// * `CheckError::DataQuality` - Lists every problem found
    pub fn gate(&self) -> Result<(), CheckError> {
        let problems = self.gate_problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CheckError::DataQuality {
                table: self.table.clone(),
                problems,
            })
        }
    }
}

/// Profile every column of an in-memory table
pub fn profile_table(name: &str, table: &Table) -> ConsistencyReport {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut inferred = ColumnType::Empty;
            let mut null_count = 0;
            for cell in table.column_cells(index) {
                match ColumnType::of(cell) {
                    Some(t) => inferred = inferred.merge(t),
                    None => null_count += 1,
                }
            }
            ColumnProfile {
                name: column.clone(),
                inferred_type: inferred,
                null_count,
                non_null_count: table.len() - null_count,
            }
        })
        .collect();

    ConsistencyReport {
        table: name.to_string(),
        rows: table.len(),
        columns,
    }
}

/// Profile a stored table; reads only
///
/// # Errors
/// * `CheckError::Store` - If the table is missing
pub fn check_table(store: &dyn TableStore, name: &str) -> Result<ConsistencyReport, CheckError> {
    let table = store.read_table(name)?;
    Ok(profile_table(name, &table))
}
