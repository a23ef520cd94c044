use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vendor_perf::analytics::queries::unsold_inventory;
use vendor_perf::analytics::{run_analysis, Estimate};
use vendor_perf::ingest::ingest_all;
use vendor_perf::metrics::{derive_metrics, load_performance, VendorPerformance};
use vendor_perf::store::{SqliteStore, TableStore};
use vendor_perf::summary::build_summary;
use vendor_perf::utils::config::{
    AnalysisConfig, SourceFile, CLEANED_TABLE, INVOICE_TABLE, PRICING_TABLE, PURCHASES_TABLE,
    SALES_TABLE, SUMMARY_TABLE,
};

const PURCHASES: &str = "\
VendorNumber,VendorName,Brand,Description,PurchasePrice,Quantity,Dollars
1,A,100,Red Wine,1.00,60,60
1,A,100,Red Wine,1.00,40,40
2,B,200,Gin,5.00,0,0
3,C,300,Vodka,2.00,100,200
";

const SALES: &str = "\
VendorNo,VendorName,Brand,Description,SalesQuantity,SalesDollars,SalesPrice,ExciseTax
1,A,100,Red Wine,30,50,1.66,0.5
1,A,100,Red Wine,20,30,1.50,0.25
2,B,200,Gin,10,70,7.00,1.0
3,C,300,Vodka,130,390,3.00,2.0
";

const PRICES: &str = "\
Brand,Description,Price,Volume
100,Red Wine,2.00,750
200,Gin,8.00,1000
300,Vodka,3.50,750
";

const INVOICES: &str = "\
VendorNumber,VendorName,Freight
1,A,10.5
1,A,4.5
3,C,20
";

fn sources() -> Vec<SourceFile> {
    [
        ("purchase_prices.csv", PRICING_TABLE),
        ("purchases.csv", PURCHASES_TABLE),
        ("sales.csv", SALES_TABLE),
        ("vendor_invoice.csv", INVOICE_TABLE),
    ]
    .iter()
    .map(|(file, table)| SourceFile {
        file: file.to_string(),
        table: table.to_string(),
    })
    .collect()
}

fn write_data_dir(dir: &Path) {
    fs::write(dir.join("purchases.csv"), PURCHASES).unwrap();
    fs::write(dir.join("sales.csv"), SALES).unwrap();
    fs::write(dir.join("purchase_prices.csv"), PRICES).unwrap();
    fs::write(dir.join("vendor_invoice.csv"), INVOICES).unwrap();
}

fn loaded_store() -> (TempDir, SqliteStore) {
    let temp_dir = tempfile::tempdir().unwrap();
    write_data_dir(temp_dir.path());
    let mut store = SqliteStore::open(temp_dir.path().join("inventory.db")).unwrap();
    ingest_all(&mut store, temp_dir.path(), &sources(), 2).unwrap();
    (temp_dir, store)
}

fn find<'a>(rows: &'a [VendorPerformance], vendor: &str) -> &'a VendorPerformance {
    rows.iter().find(|r| r.vendor_name == vendor).unwrap()
}

#[test]
fn test_pipeline_vendor_a_ratios() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    let a = find(&rows, "A");
    assert_eq!(a.total_purchase_quantity, 100.0);
    assert_eq!(a.total_purchase_dollars, 100.0);
    assert_eq!(a.total_sales_quantity, 50.0);
    assert_eq!(a.total_sales_dollars, 80.0);
    assert_eq!(a.total_gross_profit, -20.0);
    assert_eq!(a.profit_margin, -25.0);
    assert_eq!(a.stock_turnover, 0.5);
    assert_eq!(a.sales_to_purchase_ratio, 0.8);
}

#[test]
fn test_pipeline_joins_pricing_and_freight() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    let a = find(&rows, "A");
    assert_eq!(a.brand, "100");
    assert_eq!(a.description, "Red Wine");
    assert_eq!(a.actual_price, 2.0);
    assert_eq!(a.volume, 750.0);
    assert_eq!(a.purchase_price, 1.0);
    assert_eq!(a.freight_cost, 15.0);
    assert!((a.total_excise_tax - 0.75).abs() < 1e-9);

    let b = find(&rows, "B");
    assert_eq!(b.freight_cost, 0.0);
}

#[test]
fn test_pipeline_zero_purchase_quantity() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    let b = find(&rows, "B");
    assert_eq!(b.total_purchase_quantity, 0.0);
    assert_eq!(b.total_sales_quantity, 10.0);
    assert_eq!(b.stock_turnover, 0.0);
    assert_eq!(b.sales_to_purchase_ratio, 0.0);
}

#[test]
fn test_pipeline_unsold_inventory_is_clipped() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    // C sold more than it bought; A has 50 unsold at purchase price 1.0
    let unsold = unsold_inventory(&rows);
    let c = unsold.iter().find(|v| v.vendor_name == "C").unwrap();
    let a = unsold.iter().find(|v| v.vendor_name == "A").unwrap();
    assert_eq!(c.value, 0.0);
    assert_eq!(a.value, 50.0);
}

#[test]
fn test_summary_rows_ordered_by_purchase_dollars() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    let vendors: Vec<&str> = rows.iter().map(|r| r.vendor_name.as_str()).collect();
    assert_eq!(vendors, vec!["C", "A", "B"]);
}

#[test]
fn test_rebuild_is_idempotent() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let first_summary = store.read_table(SUMMARY_TABLE).unwrap();
    let first_cleaned = store.read_table(CLEANED_TABLE).unwrap();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();

    assert_eq!(store.read_table(SUMMARY_TABLE).unwrap(), first_summary);
    assert_eq!(store.read_table(CLEANED_TABLE).unwrap(), first_cleaned);
    assert_eq!(store.row_count(SUMMARY_TABLE).unwrap(), 3);
}

#[test]
fn test_summary_table_is_retained_after_cleaning() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    let before = store.read_table(SUMMARY_TABLE).unwrap();
    derive_metrics(&mut store).unwrap();

    assert_eq!(store.read_table(SUMMARY_TABLE).unwrap(), before);
    assert_eq!(
        store.read_table(CLEANED_TABLE).unwrap().columns().len(),
        before.columns().len() + 4
    );
}

#[test]
fn test_summarize_without_raw_tables_fails() {
    let mut store = SqliteStore::in_memory().unwrap();
    assert!(build_summary(&mut store).is_err());
}

#[test]
fn test_analysis_over_pipeline_output() {
    let (_dir, mut store) = loaded_store();

    build_summary(&mut store).unwrap();
    derive_metrics(&mut store).unwrap();
    let rows = load_performance(&store).unwrap();

    let report = run_analysis(&rows, &AnalysisConfig::default(), CLEANED_TABLE);

    assert_eq!(report.row_count, 3);
    assert_eq!(report.top_brands_by_sales[0].label(), "Vodka");
    let share: f64 = report.vendor_purchase_share.iter().map(|s| s.percent).sum();
    assert!((share - 100.0).abs() < 1e-9);
    // Three rows leave single-row quartile groups
    assert!(matches!(report.margin_hypothesis, Estimate::Undefined { .. }));
}
