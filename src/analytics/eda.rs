//! Exploratory statistics over the cleaned rows.

use super::queries::Metric;
use super::stats::{mean, pearson, percentile_sorted, sample_std};
use crate::metrics::VendorPerformance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// count / mean / std / min / quartiles / max of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize_column(column: &str, values: &[f64]) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    ColumnSummary {
        column: column.to_string(),
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied(),
        q25: percentile_sorted(&sorted, 25.0),
        median: percentile_sorted(&sorted, 50.0),
        q75: percentile_sorted(&sorted, 75.0),
        max: sorted.last().copied(),
    }
}

/// Summary of every numeric column
pub fn describe(rows: &[VendorPerformance]) -> Vec<ColumnSummary> {
    Metric::ALL
        .iter()
        .map(|metric| summarize_column(metric.column_name(), &metric.values(rows)))
        .collect()
}

/// Rows that made money and sold something
pub fn profitable_subset(rows: &[VendorPerformance]) -> Vec<VendorPerformance> {
    rows.iter()
        .filter(|row| {
            row.total_gross_profit > 0.0 && row.profit_margin > 0.0 && row.total_sales_quantity > 0.0
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Most frequent values, ties in order of first appearance
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<FrequencyEntry> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    let mut entries: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    entries
        .into_iter()
        .take(n)
        .map(|(value, count, _)| FrequencyEntry {
            value: value.to_string(),
            count,
        })
        .collect()
}

/// Pairwise Pearson correlations of the numeric columns
///
/// A cell is `None` when either column has zero variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(rows: &[VendorPerformance]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = Metric::ALL.iter().map(|m| m.values(rows)).collect();

    let values = series
        .iter()
        .map(|xs| series.iter().map(|ys| pearson(xs, ys)).collect())
        .collect();

    CorrelationMatrix {
        columns: Metric::ALL.iter().map(|m| m.column_name().to_string()).collect(),
        values,
    }
}
