//! The cleaned vendor/brand row and its derived ratios.

use crate::store::{coerce_column, text_column, Cell, CoercionPolicy, Table};
use crate::utils::config::{
    BASE_NUMERIC_COLUMNS, COL_BRAND, COL_DESCRIPTION, COL_VENDOR_NAME, DERIVED_COLUMNS,
};
use crate::utils::error::StoreError;
use serde::{Deserialize, Serialize};

/// `numerator / denominator` when the denominator is positive, else 0
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// One row of the cleaned summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorPerformance {
    pub vendor_name: String,
    pub brand: String,
    pub description: String,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_quantity: f64,
    pub total_sales_dollars: f64,
    pub total_sales_price: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,
    pub actual_price: f64,
    pub volume: f64,
    pub purchase_price: f64,
    pub total_gross_profit: f64,
    pub profit_margin: f64,
    pub stock_turnover: f64,
    pub sales_to_purchase_ratio: f64,
}

impl VendorPerformance {
    /// Build a row from base values, computing the four derived columns
    ///
    /// `base` is in `BASE_NUMERIC_COLUMNS` order.
    pub fn from_base(
        vendor_name: String,
        brand: String,
        description: String,
        base: [f64; 10],
    ) -> Self {
        let [
            total_purchase_quantity,
            total_purchase_dollars,
            total_sales_quantity,
            total_sales_dollars,
            total_sales_price,
            total_excise_tax,
            freight_cost,
            actual_price,
            volume,
            purchase_price,
        ] = base;

        let total_gross_profit = total_sales_dollars - total_purchase_dollars;

        Self {
            vendor_name,
            brand,
            description,
            total_purchase_quantity,
            total_purchase_dollars,
            total_sales_quantity,
            total_sales_dollars,
            total_sales_price,
            total_excise_tax,
            freight_cost,
            actual_price,
            volume,
            purchase_price,
            total_gross_profit,
            profit_margin: ratio_or_zero(total_gross_profit, total_sales_dollars) * 100.0,
            stock_turnover: ratio_or_zero(total_sales_quantity, total_purchase_quantity),
            sales_to_purchase_ratio: ratio_or_zero(total_sales_dollars, total_purchase_dollars),
        }
    }

    /// All numeric values: base columns then derived columns
    pub fn numeric_values(&self) -> [f64; 14] {
        [
            self.total_purchase_quantity,
            self.total_purchase_dollars,
            self.total_sales_quantity,
            self.total_sales_dollars,
            self.total_sales_price,
            self.total_excise_tax,
            self.freight_cost,
            self.actual_price,
            self.volume,
            self.purchase_price,
            self.total_gross_profit,
            self.profit_margin,
            self.stock_turnover,
            self.sales_to_purchase_ratio,
        ]
    }
}

/// Column names of the cleaned table, in storage order
pub fn performance_columns() -> Vec<String> {
    [COL_VENDOR_NAME, COL_BRAND, COL_DESCRIPTION]
        .iter()
        .chain(BASE_NUMERIC_COLUMNS)
        .chain(DERIVED_COLUMNS)
        .map(|c| c.to_string())
        .collect()
}

/// Convert rows to a store table
pub fn performance_table(rows: &[VendorPerformance]) -> Result<Table, StoreError> {
    let mut table = Table::new(performance_columns());
    for row in rows {
        let mut cells = vec![
            Cell::from(row.vendor_name.as_str()),
            Cell::from(row.brand.as_str()),
            Cell::from(row.description.as_str()),
        ];
        cells.extend(row.numeric_values().into_iter().map(Cell::Real));
        table.push_row(cells)?;
    }
    Ok(table)
}

/// Read rows back from a cleaned table
///
/// Values are coerced with the raw policy so that negative derived values
/// (losses) survive; unreadable cells become 0.
pub fn rows_from_table(table: &Table) -> Vec<VendorPerformance> {
    let vendors = text_column(table, COL_VENDOR_NAME);
    let brands = text_column(table, COL_BRAND);
    let descriptions = text_column(table, COL_DESCRIPTION);
    let numeric: Vec<Vec<f64>> = BASE_NUMERIC_COLUMNS
        .iter()
        .chain(DERIVED_COLUMNS)
        .map(|column| coerce_column(table, column, CoercionPolicy::RAW).values)
        .collect();

    (0..table.len())
        .map(|i| VendorPerformance {
            vendor_name: vendors[i].clone(),
            brand: brands[i].clone(),
            description: descriptions[i].clone(),
            total_purchase_quantity: numeric[0][i],
            total_purchase_dollars: numeric[1][i],
            total_sales_quantity: numeric[2][i],
            total_sales_dollars: numeric[3][i],
            total_sales_price: numeric[4][i],
            total_excise_tax: numeric[5][i],
            freight_cost: numeric[6][i],
            actual_price: numeric[7][i],
            volume: numeric[8][i],
            purchase_price: numeric[9][i],
            total_gross_profit: numeric[10][i],
            profit_margin: numeric[11][i],
            stock_turnover: numeric[12][i],
            sales_to_purchase_ratio: numeric[13][i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(purchase_qty: f64, purchase_dollars: f64, sales_qty: f64, sales_dollars: f64) -> [f64; 10] {
        [purchase_qty, purchase_dollars, sales_qty, sales_dollars, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn test_derived_losing_pair() {
        let row = VendorPerformance::from_base(
            "X".to_string(),
            "A".to_string(),
            String::new(),
            base(10.0, 100.0, 5.0, 80.0),
        );

        assert_eq!(row.total_gross_profit, -20.0);
        assert_eq!(row.profit_margin, -25.0);
        assert_eq!(row.stock_turnover, 0.5);
        assert_eq!(row.sales_to_purchase_ratio, 0.8);
    }

    #[test]
    fn test_zero_denominators() {
        let row = VendorPerformance::from_base(
            "Y".to_string(),
            "B".to_string(),
            String::new(),
            base(0.0, 0.0, 3.0, 0.0),
        );

        assert_eq!(row.profit_margin, 0.0);
        assert_eq!(row.stock_turnover, 0.0);
        assert_eq!(row.sales_to_purchase_ratio, 0.0);
    }

    #[test]
    fn test_table_round_trip() {
        let rows = vec![VendorPerformance::from_base(
            "X".to_string(),
            "A".to_string(),
            "Gin".to_string(),
            base(10.0, 100.0, 5.0, 80.0),
        )];

        let table = performance_table(&rows).unwrap();
        assert_eq!(table.columns().len(), 17);
        assert_eq!(rows_from_table(&table), rows);
    }
}
