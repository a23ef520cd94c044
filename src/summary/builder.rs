//! Vendor/brand rollup.
//!
//! Purchase and sales records are folded into one accumulator per
//! (VendorName, Brand) pair, then joined with the pricing and freight
//! lookups and persisted as the summary table.

use super::records::{
    read_freight, read_price_quotes, read_records, PriceQuote, RawRecord, RecordSource,
};
use crate::store::{Cell, Table, TableStore, WriteMode};
use crate::utils::config::{
    BASE_NUMERIC_COLUMNS, COL_BRAND, COL_DESCRIPTION, COL_VENDOR_NAME, INVOICE_TABLE,
    PRICING_TABLE, PURCHASES_TABLE, SALES_TABLE, SUMMARY_TABLE,
};
use crate::utils::error::{PipelineError, StoreError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorBrandSummary {
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
}

impl VendorBrandSummary {
    /// Numeric values in `BASE_NUMERIC_COLUMNS` order
    fn numeric_values(&self) -> [f64; 10] {
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
        ]
    }
}

/// Outcome of a summary build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub vendors: usize,
    pub purchase_records: usize,
    pub sales_records: usize,
    pub skipped_records: usize,
}

#[derive(Default)]
struct Accumulator {
    description: Option<String>,
    purchase_quantity: f64,
    purchase_dollars: f64,
    purchase_price: Option<f64>,
    sales_quantity: f64,
    sales_dollars: f64,
    sales_price: f64,
    excise_tax: f64,
}

impl Accumulator {
    fn add(&mut self, record: &RawRecord) {
        if self.description.is_none() {
            self.description = record.description.clone();
        }
        match record.source {
            RecordSource::Purchase => {
                self.purchase_quantity += record.quantity;
                self.purchase_dollars += record.dollars;
                if self.purchase_price.is_none() && record.unit_price != 0.0 {
                    self.purchase_price = Some(record.unit_price);
                }
            }
            RecordSource::Sale => {
                self.sales_quantity += record.quantity;
                self.sales_dollars += record.dollars;
                self.sales_price += record.unit_price;
                self.excise_tax += record.excise_tax;
            }
        }
    }
}

/// Roll records up into one row per (VendorName, Brand)
///
/// Purchases should come before sales so that a purchase description wins.
/// Rows are ordered by TotalPurchaseDollars descending, ties in key order.
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a RawRecord>,
    quotes: &HashMap<String, PriceQuote>,
    freight: &HashMap<String, f64>,
) -> Vec<VendorBrandSummary> {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.vendor_name.clone(), record.brand.clone()))
            .or_default()
            .add(record);
    }

    let mut rows: Vec<VendorBrandSummary> = groups
        .into_iter()
        .map(|((vendor_name, brand), acc)| {
            let quote = quotes.get(&brand);
            let description = acc
                .description
                .or_else(|| quote.and_then(|q| q.description.clone()))
                .unwrap_or_default();

            VendorBrandSummary {
                freight_cost: freight.get(&vendor_name).copied().unwrap_or(0.0),
                vendor_name,
                brand,
                description,
                total_purchase_quantity: acc.purchase_quantity,
                total_purchase_dollars: acc.purchase_dollars,
                total_sales_quantity: acc.sales_quantity,
                total_sales_dollars: acc.sales_dollars,
                total_sales_price: acc.sales_price,
                total_excise_tax: acc.excise_tax,
                actual_price: quote.map(|q| q.actual_price).unwrap_or(0.0),
                volume: quote.map(|q| q.volume).unwrap_or(0.0),
                purchase_price: acc.purchase_price.unwrap_or(0.0),
            }
        })
        .collect();

    // sort_by is stable, so equal totals keep key order
    rows.sort_by(|a, b| b.total_purchase_dollars.total_cmp(&a.total_purchase_dollars));
    rows
}

/// Convert summary rows to a store table
pub fn summary_table(rows: &[VendorBrandSummary]) -> Result<Table, StoreError> {
    let mut columns = vec![
        COL_VENDOR_NAME.to_string(),
        COL_BRAND.to_string(),
        COL_DESCRIPTION.to_string(),
    ];
    columns.extend(BASE_NUMERIC_COLUMNS.iter().map(|c| c.to_string()));

    let mut table = Table::new(columns);
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

/// Build the summary table from the raw tables in `store`
///
/// **Public** - main entry point for the summarize step
///
/// Replaces any existing summary table, so rebuilding is idempotent.
///
/// # Errors
/// * `PipelineError::Store` - If a raw table is missing or a write fails
/// * `PipelineError::MissingColumn` - If a raw table has no key column
pub fn build_summary(store: &mut dyn TableStore) -> Result<SummaryReport, PipelineError> {
    info!("Reading raw tables...");
    let purchases = read_records(
        &store.read_table(PURCHASES_TABLE)?,
        PURCHASES_TABLE,
        RecordSource::Purchase,
    )?;
    let sales = read_records(&store.read_table(SALES_TABLE)?, SALES_TABLE, RecordSource::Sale)?;
    let quotes = read_price_quotes(&store.read_table(PRICING_TABLE)?, PRICING_TABLE)?;
    let freight = read_freight(&store.read_table(INVOICE_TABLE)?, INVOICE_TABLE)?;

    debug!(
        "{} purchase records, {} sales records, {} price quotes, {} invoiced vendors",
        purchases.records.len(),
        sales.records.len(),
        quotes.len(),
        freight.len()
    );

    let rows = summarize(
        purchases.records.iter().chain(sales.records.iter()),
        &quotes,
        &freight,
    );

    let vendors = rows
        .iter()
        .map(|r| r.vendor_name.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let table = summary_table(&rows)?;
    let written = store.write_table(SUMMARY_TABLE, &table, WriteMode::Replace)?;
    info!("Wrote {} rows to {}", written, SUMMARY_TABLE);

    Ok(SummaryReport {
        rows: written,
        vendors,
        purchase_records: purchases.records.len(),
        sales_records: sales.records.len(),
        skipped_records: purchases.skipped + sales.skipped,
    })
}
