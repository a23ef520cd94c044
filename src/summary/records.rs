//! Typed views over the raw purchase, sales, pricing and invoice tables.

use crate::store::{coerce_column, CoercionPolicy, Table};
use crate::utils::config::{
    ACTUAL_PRICE_FIELDS, BRAND_FIELDS, DESCRIPTION_FIELDS, EXCISE_TAX_FIELDS, FREIGHT_FIELDS,
    PURCHASE_DOLLARS_FIELDS, PURCHASE_PRICE_FIELDS, PURCHASE_QUANTITY_FIELDS,
    SALES_DOLLARS_FIELDS, SALES_PRICE_FIELDS, SALES_QUANTITY_FIELDS, VENDOR_NAME_FIELDS,
    VOLUME_FIELDS,
};
use crate::utils::error::PipelineError;
use std::collections::HashMap;

/// Which raw table a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Purchase,
    Sale,
}

impl RecordSource {
    fn quantity_fields(self) -> &'static [&'static str] {
        match self {
            RecordSource::Purchase => PURCHASE_QUANTITY_FIELDS,
            RecordSource::Sale => SALES_QUANTITY_FIELDS,
        }
    }

    fn dollars_fields(self) -> &'static [&'static str] {
        match self {
            RecordSource::Purchase => PURCHASE_DOLLARS_FIELDS,
            RecordSource::Sale => SALES_DOLLARS_FIELDS,
        }
    }

    fn price_fields(self) -> &'static [&'static str] {
        match self {
            RecordSource::Purchase => PURCHASE_PRICE_FIELDS,
            RecordSource::Sale => SALES_PRICE_FIELDS,
        }
    }
}

/// One purchase or sales line
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub source: RecordSource,
    pub vendor_name: String,
    pub brand: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub dollars: f64,
    pub unit_price: f64,
    pub excise_tax: f64,
}

/// Pricing row for one brand
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub actual_price: f64,
    pub volume: f64,
    pub description: Option<String>,
}

/// Records read from a table plus the rows that had no key
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

/// Read every keyed record of a purchase or sales table
///
/// Rows without a vendor name or brand are skipped and counted.
///
/// # Errors
/// * `PipelineError::MissingColumn` - If the vendor or brand column is absent
pub fn read_records(
    table: &Table,
    table_name: &str,
    source: RecordSource,
) -> Result<RecordBatch, PipelineError> {
    let vendor_idx = require(table, table_name, VENDOR_NAME_FIELDS)?;
    let brand_idx = require(table, table_name, BRAND_FIELDS)?;
    let description_idx = table.find_column(DESCRIPTION_FIELDS);

    let quantity = numeric(table, source.quantity_fields());
    let dollars = numeric(table, source.dollars_fields());
    let unit_price = numeric(table, source.price_fields());
    let excise_tax = match source {
        RecordSource::Sale => numeric(table, EXCISE_TAX_FIELDS),
        RecordSource::Purchase => vec![0.0; table.len()],
    };

    let mut batch = RecordBatch {
        records: Vec::with_capacity(table.len()),
        skipped: 0,
    };

    for (i, row) in table.rows().iter().enumerate() {
        let (Some(vendor_name), Some(brand)) = (key_text(&row[vendor_idx]), key_text(&row[brand_idx]))
        else {
            batch.skipped += 1;
            continue;
        };

        batch.records.push(RawRecord {
            source,
            vendor_name,
            brand,
            description: description_idx.and_then(|idx| key_text(&row[idx])),
            quantity: quantity[i],
            dollars: dollars[i],
            unit_price: unit_price[i],
            excise_tax: excise_tax[i],
        });
    }

    Ok(batch)
}

/// Brand -> pricing row; the first row for a brand wins
pub fn read_price_quotes(
    table: &Table,
    table_name: &str,
) -> Result<HashMap<String, PriceQuote>, PipelineError> {
    let brand_idx = require(table, table_name, BRAND_FIELDS)?;
    let description_idx = table.find_column(DESCRIPTION_FIELDS);
    let prices = numeric(table, ACTUAL_PRICE_FIELDS);
    let volumes = numeric(table, VOLUME_FIELDS);

    let mut quotes = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let Some(brand) = key_text(&row[brand_idx]) else {
            continue;
        };
        quotes.entry(brand).or_insert_with(|| PriceQuote {
            actual_price: prices[i],
            volume: volumes[i],
            description: description_idx.and_then(|idx| key_text(&row[idx])),
        });
    }
    Ok(quotes)
}

/// Vendor -> total invoice freight
pub fn read_freight(table: &Table, table_name: &str) -> Result<HashMap<String, f64>, PipelineError> {
    let vendor_idx = require(table, table_name, VENDOR_NAME_FIELDS)?;
    let freight = numeric(table, FREIGHT_FIELDS);

    let mut totals: HashMap<String, f64> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(vendor) = key_text(&row[vendor_idx]) {
            *totals.entry(vendor).or_insert(0.0) += freight[i];
        }
    }
    Ok(totals)
}

fn require(table: &Table, table_name: &str, aliases: &[&str]) -> Result<usize, PipelineError> {
    table
        .find_column(aliases)
        .ok_or_else(|| PipelineError::MissingColumn {
            table: table_name.to_string(),
            column: aliases.first().copied().unwrap_or_default().to_string(),
        })
}

/// Coerce the first present alias column, zeros if none is present
fn numeric(table: &Table, aliases: &[&str]) -> Vec<f64> {
    match table.find_column(aliases) {
        Some(idx) => coerce_column(table, &table.columns()[idx], CoercionPolicy::RAW).values,
        None => vec![0.0; table.len()],
    }
}

/// Trimmed, non-empty text of a key cell
fn key_text(cell: &crate::store::Cell) -> Option<String> {
    cell.as_text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;

    fn purchases() -> Table {
        let mut table = Table::with_columns(&[
            "VendorName",
            "Brand",
            "Description",
            "PurchasePrice",
            "Quantity",
            "Dollars",
        ]);
        table
            .push_row(vec![
                Cell::from("  DIAGEO  "),
                Cell::Integer(58),
                Cell::from("Gin"),
                Cell::Real(10.0),
                Cell::Integer(5),
                Cell::Real(50.0),
            ])
            .unwrap();
        table
            .push_row(vec![
                Cell::Null,
                Cell::Integer(60),
                Cell::Null,
                Cell::Real(1.0),
                Cell::Integer(1),
                Cell::Real(1.0),
            ])
            .unwrap();
        table
    }

    #[test]
    fn test_read_records_trims_and_skips() {
        let batch = read_records(&purchases(), "purchases", RecordSource::Purchase).unwrap();

        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.vendor_name, "DIAGEO");
        assert_eq!(record.brand, "58");
        assert_eq!(record.quantity, 5.0);
        assert_eq!(record.dollars, 50.0);
        assert_eq!(record.unit_price, 10.0);
        assert_eq!(record.excise_tax, 0.0);
    }

    #[test]
    fn test_missing_brand_column() {
        let table = Table::with_columns(&["VendorName"]);
        let result = read_records(&table, "sales", RecordSource::Sale);
        assert!(matches!(
            result,
            Err(PipelineError::MissingColumn { column, .. }) if column == "Brand"
        ));
    }

    #[test]
    fn test_price_quotes_first_wins() {
        let mut table = Table::with_columns(&["Brand", "Description", "Price", "Volume"]);
        table
            .push_row(vec![Cell::Integer(58), Cell::from("Gin"), Cell::Real(12.99), Cell::from("750")])
            .unwrap();
        table
            .push_row(vec![Cell::Integer(58), Cell::from("Other"), Cell::Real(1.0), Cell::Integer(1)])
            .unwrap();

        let quotes = read_price_quotes(&table, "purchase_prices").unwrap();
        let quote = &quotes["58"];
        assert_eq!(quote.actual_price, 12.99);
        assert_eq!(quote.volume, 750.0);
        assert_eq!(quote.description.as_deref(), Some("Gin"));
    }

    #[test]
    fn test_freight_summed_by_vendor() {
        let mut table = Table::with_columns(&["VendorName", "Freight"]);
        table.push_row(vec![Cell::from("X "), Cell::Real(2.5)]).unwrap();
        table.push_row(vec![Cell::from("X"), Cell::Real(1.5)]).unwrap();
        table.push_row(vec![Cell::from("Y"), Cell::from("n/a")]).unwrap();

        let freight = read_freight(&table, "vendor_invoice").unwrap();
        assert_eq!(freight["X"], 4.0);
        assert_eq!(freight["Y"], 0.0);
    }
}
