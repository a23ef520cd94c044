//! Consistency checker and store inventory.

pub mod consistency;
pub mod inventory;

pub use consistency::{check_table, profile_table, ColumnProfile, ColumnType, ConsistencyReport};
pub use inventory::{inventory, TableInfo};
