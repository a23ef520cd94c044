//! Store inventory: every table with its size.

use crate::store::TableStore;
use crate::utils::error::StoreError;
use serde::{Deserialize, Serialize};

/// Size of one stored table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub rows: u64,
    pub columns: Vec<String>,
}

/// List every table in creation order
pub fn inventory(store: &dyn TableStore) -> Result<Vec<TableInfo>, StoreError> {
    store
        .table_names()?
        .into_iter()
        .map(|name| {
            let rows = store.row_count(&name)?;
            let columns = store.read_head(&name, 0)?.columns().to_vec();
            Ok(TableInfo { name, rows, columns })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Cell, SqliteStore, Table, WriteMode};

    #[test]
    fn test_inventory_lists_tables() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut table = Table::with_columns(&["a", "b"]);
        table.push_row(vec![Cell::Integer(1), Cell::Null]).unwrap();
        store.write_table("first", &table, WriteMode::Replace).unwrap();
        store
            .write_table("second", &Table::with_columns(&["c"]), WriteMode::Replace)
            .unwrap();

        let tables = inventory(&store).unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "first");
        assert_eq!(tables[0].rows, 1);
        assert_eq!(tables[0].columns, vec!["a", "b"]);
        assert_eq!(tables[1].rows, 0);
    }
}
