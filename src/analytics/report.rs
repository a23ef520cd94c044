//! The versioned analysis report.

use super::eda::{
    correlation_matrix, describe, profitable_subset, value_counts, ColumnSummary,
    CorrelationMatrix, FrequencyEntry,
};
use super::queries::{
    concentration_share, extremes, margin_confidence_intervals, margin_hypothesis_test,
    promo_candidates, quantile_buckets, share_with_others, top_n_by, unsold_inventory,
    BucketStats, GroupKey, GroupTotal, HypothesisOutcome, MarginIntervals, Metric, Order,
    PromoCandidates, ShareEntry, ShareSlice, VendorValue,
};
use super::stats::Estimate;
use crate::metrics::VendorPerformance;
use crate::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Describe statistics of the profitable subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

/// Every query result for one cleaned table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Report schema version
    pub version: String,

    /// RFC 3339 timestamp
    pub generated_at: String,

    pub source_table: String,
    pub row_count: usize,

    pub describe: Vec<ColumnSummary>,
    pub profitable: ProfitableSummary,
    pub top_vendors_by_frequency: Vec<FrequencyEntry>,
    pub top_products_by_frequency: Vec<FrequencyEntry>,
    pub correlations: CorrelationMatrix,

    pub promo_candidates: PromoCandidates,
    pub top_brands_by_sales: Vec<GroupTotal>,
    pub vendor_purchase_concentration: Vec<ShareEntry>,
    pub vendor_purchase_share: Vec<ShareSlice>,
    pub bulk_purchase_effect: Vec<BucketStats>,
    pub low_turnover: Vec<VendorPerformance>,
    pub unsold_inventory: Vec<VendorValue>,
    pub margin_intervals: Estimate<MarginIntervals>,
    pub margin_hypothesis: Estimate<HypothesisOutcome>,
}

impl AnalysisReport {
    /// Names of the statistics that could not be computed
    pub fn undefined_entries(&self) -> Vec<String> {
        let mut entries = Vec::new();
        match &self.margin_intervals {
            Estimate::Undefined { reason } => entries.push(format!("margin_intervals: {}", reason)),
            Estimate::Computed { value } => {
                if let Estimate::Undefined { reason } = &value.top {
                    entries.push(format!("margin_intervals.top: {}", reason));
                }
                if let Estimate::Undefined { reason } = &value.low {
                    entries.push(format!("margin_intervals.low: {}", reason));
                }
            }
        }
        if let Estimate::Undefined { reason } = &self.margin_hypothesis {
            entries.push(format!("margin_hypothesis: {}", reason));
        }
        entries
    }
}

/// Run the whole query catalog
///
/// **Public** - main entry point for the analyze step
///
/// Never fails: statistics that cannot be computed are recorded as
/// `Estimate::Undefined`.
pub fn run_analysis(
    rows: &[VendorPerformance],
    config: &AnalysisConfig,
    source_table: &str,
) -> AnalysisReport {
    let n = config.top_n;
    info!("Analyzing {} rows (top {})", rows.len(), n);

    debug!("Computing exploratory statistics...");
    let profitable = profitable_subset(rows);
    let profitable = ProfitableSummary {
        rows: profitable.len(),
        columns: describe(&profitable),
    };

    debug!("Running business queries...");
    let report = AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        source_table: source_table.to_string(),
        row_count: rows.len(),
        describe: describe(rows),
        profitable,
        top_vendors_by_frequency: value_counts(rows.iter().map(|r| r.vendor_name.as_str()), n),
        top_products_by_frequency: value_counts(rows.iter().map(|r| r.description.as_str()), n),
        correlations: correlation_matrix(rows),
        promo_candidates: promo_candidates(rows),
        top_brands_by_sales: top_n_by(
            rows,
            GroupKey::BrandDescription,
            Metric::TotalSalesDollars,
            n,
        ),
        vendor_purchase_concentration: concentration_share(
            rows,
            GroupKey::Vendor,
            Metric::TotalPurchaseDollars,
            n,
        ),
        vendor_purchase_share: share_with_others(
            rows,
            GroupKey::Vendor,
            Metric::TotalPurchaseDollars,
            n,
        ),
        bulk_purchase_effect: quantile_buckets(
            rows,
            Metric::TotalPurchaseQuantity,
            Metric::PurchasePrice,
        ),
        low_turnover: extremes(rows, Metric::StockTurnover, Order::Ascending, n),
        unsold_inventory: unsold_inventory(rows),
        margin_intervals: margin_confidence_intervals(rows, config.confidence).into(),
        margin_hypothesis: margin_hypothesis_test(rows, config.alpha).into(),
    };

    for entry in report.undefined_entries() {
        info!("Undefined statistic: {}", entry);
    }
    report
}
