//! The fixed catalog of vendor/brand queries.
//!
//! Every query is a pure function of the cleaned rows. Grouped totals are
//! accumulated in key order and then stably sorted, so equal totals always
//! come out in key order.

use super::stats::{
    confidence_interval, mean, median, percentile, welch_t_test, ConfidenceInterval, Estimate,
    WelchTest,
};
use crate::metrics::VendorPerformance;
use crate::utils::config::{
    COL_ACTUAL_PRICE, COL_FREIGHT_COST, COL_PROFIT_MARGIN, COL_PURCHASE_PRICE,
    COL_SALES_TO_PURCHASE_RATIO, COL_STOCK_TURNOVER, COL_TOTAL_EXCISE_TAX,
    COL_TOTAL_GROSS_PROFIT, COL_TOTAL_PURCHASE_DOLLARS, COL_TOTAL_PURCHASE_QUANTITY,
    COL_TOTAL_SALES_DOLLARS, COL_TOTAL_SALES_PRICE, COL_TOTAL_SALES_QUANTITY, COL_VOLUME,
};
use crate::utils::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label of the remainder slice in share breakdowns
pub const OTHERS_LABEL: &str = "Others";

/// A numeric column of the cleaned table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    TotalPurchaseQuantity,
    TotalPurchaseDollars,
    TotalSalesQuantity,
    TotalSalesDollars,
    TotalSalesPrice,
    TotalExciseTax,
    FreightCost,
    ActualPrice,
    Volume,
    PurchasePrice,
    TotalGrossProfit,
    ProfitMargin,
    StockTurnover,
    SalesToPurchaseRatio,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::TotalPurchaseQuantity,
        Metric::TotalPurchaseDollars,
        Metric::TotalSalesQuantity,
        Metric::TotalSalesDollars,
        Metric::TotalSalesPrice,
        Metric::TotalExciseTax,
        Metric::FreightCost,
        Metric::ActualPrice,
        Metric::Volume,
        Metric::PurchasePrice,
        Metric::TotalGrossProfit,
        Metric::ProfitMargin,
        Metric::StockTurnover,
        Metric::SalesToPurchaseRatio,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Metric::TotalPurchaseQuantity => COL_TOTAL_PURCHASE_QUANTITY,
            Metric::TotalPurchaseDollars => COL_TOTAL_PURCHASE_DOLLARS,
            Metric::TotalSalesQuantity => COL_TOTAL_SALES_QUANTITY,
            Metric::TotalSalesDollars => COL_TOTAL_SALES_DOLLARS,
            Metric::TotalSalesPrice => COL_TOTAL_SALES_PRICE,
            Metric::TotalExciseTax => COL_TOTAL_EXCISE_TAX,
            Metric::FreightCost => COL_FREIGHT_COST,
            Metric::ActualPrice => COL_ACTUAL_PRICE,
            Metric::Volume => COL_VOLUME,
            Metric::PurchasePrice => COL_PURCHASE_PRICE,
            Metric::TotalGrossProfit => COL_TOTAL_GROSS_PROFIT,
            Metric::ProfitMargin => COL_PROFIT_MARGIN,
            Metric::StockTurnover => COL_STOCK_TURNOVER,
            Metric::SalesToPurchaseRatio => COL_SALES_TO_PURCHASE_RATIO,
        }
    }

    pub fn value(self, row: &VendorPerformance) -> f64 {
        match self {
            Metric::TotalPurchaseQuantity => row.total_purchase_quantity,
            Metric::TotalPurchaseDollars => row.total_purchase_dollars,
            Metric::TotalSalesQuantity => row.total_sales_quantity,
            Metric::TotalSalesDollars => row.total_sales_dollars,
            Metric::TotalSalesPrice => row.total_sales_price,
            Metric::TotalExciseTax => row.total_excise_tax,
            Metric::FreightCost => row.freight_cost,
            Metric::ActualPrice => row.actual_price,
            Metric::Volume => row.volume,
            Metric::PurchasePrice => row.purchase_price,
            Metric::TotalGrossProfit => row.total_gross_profit,
            Metric::ProfitMargin => row.profit_margin,
            Metric::StockTurnover => row.stock_turnover,
            Metric::SalesToPurchaseRatio => row.sales_to_purchase_ratio,
        }
    }

    /// Column values in row order
    pub fn values(self, rows: &[VendorPerformance]) -> Vec<f64> {
        rows.iter().map(|row| self.value(row)).collect()
    }
}

/// Grouping used by the top-N and share queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    /// (Brand, Description)
    BrandDescription,
    /// VendorName
    Vendor,
}

impl GroupKey {
    fn keys(self, row: &VendorPerformance) -> Vec<String> {
        match self {
            GroupKey::BrandDescription => vec![row.brand.clone(), row.description.clone()],
            GroupKey::Vendor => vec![row.vendor_name.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Summed metric for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub keys: Vec<String>,
    pub total: f64,
}

impl GroupTotal {
    /// Display label: the most specific key
    pub fn label(&self) -> &str {
        self.keys.last().map(String::as_str).unwrap_or_default()
    }
}

/// Sum `metric` per group, sorted descending
pub fn group_totals(rows: &[VendorPerformance], key: GroupKey, metric: Metric) -> Vec<GroupTotal> {
    let mut groups: BTreeMap<Vec<String>, f64> = BTreeMap::new();
    for row in rows {
        *groups.entry(key.keys(row)).or_insert(0.0) += metric.value(row);
    }

    let mut totals: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(keys, total)| GroupTotal { keys, total })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// The `n` largest groups by summed `metric`
pub fn top_n_by(
    rows: &[VendorPerformance],
    key: GroupKey,
    metric: Metric,
    n: usize,
) -> Vec<GroupTotal> {
    let mut totals = group_totals(rows, key, metric);
    totals.truncate(n);
    totals
}

/// Rows with low sales but high margin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCandidates {
    pub sales_median: Option<f64>,
    pub margin_median: Option<f64>,
    pub rows: Vec<VendorPerformance>,
}

/// Rows below the TotalSalesDollars median and above the ProfitMargin median
pub fn promo_candidates(rows: &[VendorPerformance]) -> PromoCandidates {
    let sales_median = median(&Metric::TotalSalesDollars.values(rows));
    let margin_median = median(&Metric::ProfitMargin.values(rows));

    let selected = match (sales_median, margin_median) {
        (Some(sales), Some(margin)) => rows
            .iter()
            .filter(|row| row.total_sales_dollars < sales && row.profit_margin > margin)
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    PromoCandidates {
        sales_median,
        margin_median,
        rows: selected,
    }
}

/// One group's share of the grand total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub label: String,
    pub total: f64,
    pub percent: f64,
    /// Running percentage within the returned slice
    pub cumulative_percent: f64,
}

fn percent_of(total: f64, grand_total: f64) -> f64 {
    if grand_total == 0.0 {
        0.0
    } else {
        100.0 * total / grand_total
    }
}

/// Pareto view: top `n` groups with their share and running share
///
/// Shares are of the grand total over all groups; the running share only
/// accumulates over the returned slice.
pub fn concentration_share(
    rows: &[VendorPerformance],
    key: GroupKey,
    metric: Metric,
    n: usize,
) -> Vec<ShareEntry> {
    let totals = group_totals(rows, key, metric);
    let grand_total: f64 = totals.iter().map(|g| g.total).sum();

    let mut cumulative = 0.0;
    totals
        .into_iter()
        .take(n)
        .map(|group| {
            let percent = percent_of(group.total, grand_total);
            cumulative += percent;
            ShareEntry {
                label: group.label().to_string(),
                total: group.total,
                percent,
                cumulative_percent: cumulative,
            }
        })
        .collect()
}

/// One slice of a share breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSlice {
    pub label: String,
    pub total: f64,
    pub percent: f64,
}

/// Top `n` groups plus an "Others" slice holding the remainder
///
/// The remainder slice is only added when groups remain beyond the top `n`.
pub fn share_with_others(
    rows: &[VendorPerformance],
    key: GroupKey,
    metric: Metric,
    n: usize,
) -> Vec<ShareSlice> {
    let totals = group_totals(rows, key, metric);
    let grand_total: f64 = totals.iter().map(|g| g.total).sum();
    let remaining_groups = totals.len().saturating_sub(n);

    let mut slices: Vec<ShareSlice> = totals
        .iter()
        .take(n)
        .map(|group| ShareSlice {
            label: group.label().to_string(),
            total: group.total,
            percent: percent_of(group.total, grand_total),
        })
        .collect();

    if remaining_groups > 0 {
        let top_total: f64 = slices.iter().map(|s| s.total).sum();
        let others = grand_total - top_total;
        slices.push(ShareSlice {
            label: OTHERS_LABEL.to_string(),
            total: others,
            percent: percent_of(others, grand_total),
        });
    }
    slices
}

/// Equal-frequency size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuantityBucket {
    Small,
    Medium,
    Large,
}

impl QuantityBucket {
    pub const ALL: [QuantityBucket; 3] =
        [QuantityBucket::Small, QuantityBucket::Medium, QuantityBucket::Large];
}

/// Assign each value a bucket by rank
///
/// Ranks run 1..=n by value, ties broken by position. Rank `r` is Small when
/// it falls in the first third of the rank range, Medium in the second.
pub fn assign_buckets(values: &[f64]) -> Vec<QuantityBucket> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut buckets = vec![QuantityBucket::Small; n];
    let span = n.saturating_sub(1);
    for (rank0, &index) in order.iter().enumerate() {
        // rank0 = r - 1
        buckets[index] = if 3 * rank0 <= span {
            QuantityBucket::Small
        } else if 3 * rank0 <= 2 * span {
            QuantityBucket::Medium
        } else {
            QuantityBucket::Large
        };
    }
    buckets
}

/// Price statistics for one quantity bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub bucket: QuantityBucket,
    pub count: usize,
    pub mean_price: Option<f64>,
}

/// Bucket rows by `quantity`, then average `price` per bucket
pub fn quantile_buckets(
    rows: &[VendorPerformance],
    quantity: Metric,
    price: Metric,
) -> Vec<BucketStats> {
    let buckets = assign_buckets(&quantity.values(rows));

    QuantityBucket::ALL
        .iter()
        .map(|&bucket| {
            let prices: Vec<f64> = rows
                .iter()
                .zip(&buckets)
                .filter(|(_, b)| **b == bucket)
                .map(|(row, _)| price.value(row))
                .collect();
            BucketStats {
                bucket,
                count: prices.len(),
                mean_price: mean(&prices),
            }
        })
        .collect()
}

/// The first `n` rows after a stable sort by `metric`
pub fn extremes(
    rows: &[VendorPerformance],
    metric: Metric,
    order: Order,
    n: usize,
) -> Vec<VendorPerformance> {
    let mut sorted: Vec<&VendorPerformance> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        let cmp = metric.value(a).total_cmp(&metric.value(b));
        match order {
            Order::Ascending => cmp,
            Order::Descending => cmp.reverse(),
        }
    });
    sorted.into_iter().take(n).cloned().collect()
}

/// Capital tied up in unsold stock for one vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorValue {
    pub vendor_name: String,
    pub value: f64,
}

/// Value of a row's unsold stock
///
/// Unsold quantity is clipped at zero; unit cost falls back to the list
/// price when no purchase price was recorded.
pub fn unsold_value(row: &VendorPerformance) -> f64 {
    let unsold_quantity = (row.total_purchase_quantity - row.total_sales_quantity).max(0.0);
    let unit_cost = if row.purchase_price > 0.0 {
        row.purchase_price
    } else {
        row.actual_price
    };
    unsold_quantity * unit_cost
}

/// Unsold inventory value per vendor, largest first
pub fn unsold_inventory(rows: &[VendorPerformance]) -> Vec<VendorValue> {
    let mut by_vendor: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *by_vendor.entry(row.vendor_name.as_str()).or_insert(0.0) += unsold_value(row);
    }

    let mut values: Vec<VendorValue> = by_vendor
        .into_iter()
        .map(|(vendor, value)| VendorValue {
            vendor_name: vendor.to_string(),
            value,
        })
        .collect();
    values.sort_by(|a, b| b.value.total_cmp(&a.value));
    values
}

/// Upper and lower quartile groups of one metric
struct QuartileSplit {
    upper_threshold: f64,
    lower_threshold: f64,
    top: Vec<f64>,
    low: Vec<f64>,
}

/// Split `target` values by the quartiles of `split_by`
fn quartile_split(
    rows: &[VendorPerformance],
    split_by: Metric,
    target: Metric,
) -> Result<QuartileSplit, AnalysisError> {
    let values = split_by.values(rows);
    let (Some(upper_threshold), Some(lower_threshold)) =
        (percentile(&values, 75.0), percentile(&values, 25.0))
    else {
        return Err(AnalysisError::StatisticalUndefined(format!(
            "no rows to split by {}",
            split_by.column_name()
        )));
    };

    let top = rows
        .iter()
        .filter(|row| split_by.value(row) >= upper_threshold)
        .map(|row| target.value(row))
        .collect();
    let low = rows
        .iter()
        .filter(|row| split_by.value(row) <= lower_threshold)
        .map(|row| target.value(row))
        .collect();

    Ok(QuartileSplit {
        upper_threshold,
        lower_threshold,
        top,
        low,
    })
}

/// Confidence intervals for the top and bottom ProfitMargin quartiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginIntervals {
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub top: Estimate<ConfidenceInterval>,
    pub low: Estimate<ConfidenceInterval>,
}

/// Mean ProfitMargin with a Student-t interval for rows at or above the
/// 75th percentile and at or below the 25th percentile of ProfitMargin
pub fn margin_confidence_intervals(
    rows: &[VendorPerformance],
    confidence: f64,
) -> Result<MarginIntervals, AnalysisError> {
    let split = quartile_split(rows, Metric::ProfitMargin, Metric::ProfitMargin)?;
    Ok(MarginIntervals {
        upper_threshold: split.upper_threshold,
        lower_threshold: split.lower_threshold,
        top: confidence_interval(&split.top, confidence).into(),
        low: confidence_interval(&split.low, confidence).into(),
    })
}

/// Welch test of ProfitMargin between top and bottom sales quartiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisOutcome {
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub top_count: usize,
    pub low_count: usize,
    pub test: WelchTest,
    pub alpha: f64,
    /// p < alpha
    pub reject_null: bool,
}

/// Do high-sales rows have a different ProfitMargin than low-sales rows?
///
/// # Errors
/// * `AnalysisError::StatisticalUndefined` - If either group is too small or
///   both have zero variance
pub fn margin_hypothesis_test(
    rows: &[VendorPerformance],
    alpha: f64,
) -> Result<HypothesisOutcome, AnalysisError> {
    let split = quartile_split(rows, Metric::TotalSalesDollars, Metric::ProfitMargin)?;
    let test = welch_t_test(&split.top, &split.low)?;
    Ok(HypothesisOutcome {
        upper_threshold: split.upper_threshold,
        lower_threshold: split.lower_threshold,
        top_count: split.top.len(),
        low_count: split.low.len(),
        reject_null: test.p_value < alpha,
        test,
        alpha,
    })
}
