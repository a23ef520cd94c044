//! Configuration and constants for the pipeline.
//!
//! Constants describe the well-known tables and columns. `PipelineConfig`
//! is the optional TOML file that overrides paths and analysis defaults.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current analysis report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default rows per ingestion chunk
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;

/// Number of groups/rows kept by every top-N query
pub const DEFAULT_TOP_N: usize = 10;

/// Confidence level for the margin intervals
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Significance level for the hypothesis test
pub const DEFAULT_ALPHA: f64 = 0.05;

pub const DEFAULT_DATABASE: &str = "inventory.db";
pub const DEFAULT_DATA_DIR: &str = "data/csv_files";

// Store table names
pub const PURCHASES_TABLE: &str = "purchases";
pub const SALES_TABLE: &str = "sales";
pub const PRICING_TABLE: &str = "purchase_prices";
pub const INVOICE_TABLE: &str = "vendor_invoice";
pub const SUMMARY_TABLE: &str = "vendor_sales_summary";
pub const CLEANED_TABLE: &str = "vendor_sales_summary_cleaned";

/// CSV file name -> table name, in ingestion order
pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("begin_inventory.csv", "begin_inventory"),
    ("end_inventory.csv", "end_inventory"),
    ("purchase_prices.csv", PRICING_TABLE),
    ("purchases.csv", PURCHASES_TABLE),
    ("sales.csv", SALES_TABLE),
    ("vendor_invoice.csv", INVOICE_TABLE),
];

// Summary column names
pub const COL_VENDOR_NAME: &str = "VendorName";
pub const COL_BRAND: &str = "Brand";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_TOTAL_PURCHASE_QUANTITY: &str = "TotalPurchaseQuantity";
pub const COL_TOTAL_PURCHASE_DOLLARS: &str = "TotalPurchaseDollars";
pub const COL_TOTAL_SALES_QUANTITY: &str = "TotalSalesQuantity";
pub const COL_TOTAL_SALES_DOLLARS: &str = "TotalSalesDollars";
pub const COL_TOTAL_SALES_PRICE: &str = "TotalSalesPrice";
pub const COL_TOTAL_EXCISE_TAX: &str = "TotalExciseTax";
pub const COL_FREIGHT_COST: &str = "FreightCost";
pub const COL_ACTUAL_PRICE: &str = "ActualPrice";
pub const COL_VOLUME: &str = "Volume";
pub const COL_PURCHASE_PRICE: &str = "PurchasePrice";
pub const COL_TOTAL_GROSS_PROFIT: &str = "TotalGrossProfit";
pub const COL_PROFIT_MARGIN: &str = "ProfitMargin";
pub const COL_STOCK_TURNOVER: &str = "StockTurnover";
pub const COL_SALES_TO_PURCHASE_RATIO: &str = "SalesToPurchaseRatio";

/// Numeric columns produced by the summary builder
pub const BASE_NUMERIC_COLUMNS: &[&str] = &[
    COL_TOTAL_PURCHASE_QUANTITY,
    COL_TOTAL_PURCHASE_DOLLARS,
    COL_TOTAL_SALES_QUANTITY,
    COL_TOTAL_SALES_DOLLARS,
    COL_TOTAL_SALES_PRICE,
    COL_TOTAL_EXCISE_TAX,
    COL_FREIGHT_COST,
    COL_ACTUAL_PRICE,
    COL_VOLUME,
    COL_PURCHASE_PRICE,
];

/// Columns appended by the metric deriver
pub const DERIVED_COLUMNS: &[&str] = &[
    COL_TOTAL_GROSS_PROFIT,
    COL_PROFIT_MARGIN,
    COL_STOCK_TURNOVER,
    COL_SALES_TO_PURCHASE_RATIO,
];

/// Columns every derived ratio reads; nulls here fail the consistency gate
pub const RATIO_INPUT_COLUMNS: &[&str] = &[
    COL_TOTAL_PURCHASE_QUANTITY,
    COL_TOTAL_PURCHASE_DOLLARS,
    COL_TOTAL_SALES_QUANTITY,
    COL_TOTAL_SALES_DOLLARS,
];

// Field names in the raw tables (first alias present wins)
pub const VENDOR_NAME_FIELDS: &[&str] = &["VendorName", "vendor_name", "Vendor"];
pub const BRAND_FIELDS: &[&str] = &["Brand", "brand"];
pub const DESCRIPTION_FIELDS: &[&str] = &["Description", "description"];
pub const PURCHASE_QUANTITY_FIELDS: &[&str] = &["Quantity", "quantity"];
pub const PURCHASE_DOLLARS_FIELDS: &[&str] = &["Dollars", "dollars"];
pub const PURCHASE_PRICE_FIELDS: &[&str] = &["PurchasePrice", "purchase_price"];
pub const SALES_QUANTITY_FIELDS: &[&str] = &["SalesQuantity", "sales_quantity"];
pub const SALES_DOLLARS_FIELDS: &[&str] = &["SalesDollars", "sales_dollars"];
pub const SALES_PRICE_FIELDS: &[&str] = &["SalesPrice", "sales_price"];
pub const EXCISE_TAX_FIELDS: &[&str] = &["ExciseTax", "excise_tax"];
pub const ACTUAL_PRICE_FIELDS: &[&str] = &["Price", "price"];
pub const VOLUME_FIELDS: &[&str] = &["Volume", "volume"];
pub const FREIGHT_FIELDS: &[&str] = &["Freight", "freight"];

/// Pipeline configuration, loadable from TOML
///
/// Every field has a default so a partial file (or none at all) works.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// SQLite database file
    pub database: PathBuf,

    /// Directory holding the source CSV files
    pub data_dir: PathBuf,

    /// Rows per ingestion chunk
    pub chunk_size: usize,

    /// CSV file -> table mapping
    pub sources: Vec<SourceFile>,

    pub analysis: AnalysisConfig,

    pub charts: ChartsConfig,
}

/// One CSV file and the table it lands in
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceFile {
    pub file: String,
    pub table: String,
}

/// Analysis parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_n: usize,
    pub confidence: f64,
    pub alpha: f64,
}

/// Chart rendering parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Directory for SVG charts; `None` disables rendering
    pub dir: Option<PathBuf>,
    pub width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            sources: DEFAULT_SOURCES
                .iter()
                .map(|(file, table)| SourceFile {
                    file: file.to_string(),
                    table: table.to_string(),
                })
                .collect(),
            analysis: AnalysisConfig::default(),
            charts: ChartsConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            confidence: DEFAULT_CONFIDENCE,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            width: 1000,
        }
    }
}

impl PipelineConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than 0".to_string()));
        }
        if self.analysis.top_n == 0 {
            return Err(ConfigError::Invalid("analysis.top_n must be greater than 0".to_string()));
        }
        if !(self.analysis.confidence > 0.0 && self.analysis.confidence < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.confidence must be in (0, 1), got {}",
                self.analysis.confidence
            )));
        }
        if !(self.analysis.alpha > 0.0 && self.analysis.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.alpha must be in (0, 1), got {}",
                self.analysis.alpha
            )));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("sources must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load a pipeline configuration from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Parse` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
