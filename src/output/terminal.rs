//! Terminal output rendering.
//!
//! Human-readable summaries of each pipeline step, with color cues
//! for the consistency gate and undefined statistics.

use crate::analytics::stats::{ConfidenceInterval, Estimate};
use crate::analytics::AnalysisReport;
use crate::checker::{ConsistencyReport, TableInfo};
use crate::ingest::IngestSummary;
use crate::metrics::DerivationReport;
use crate::store::Table;
use crate::summary::SummaryReport;
use colored::*;

const RULE: &str = "---------------------------------------------------\n";

/// Render the analysis report, showing at most `head` rows per query
pub fn render_terminal_report(report: &AnalysisReport, head: usize) -> String {
    let mut out = String::new();

    out.push_str(&render_report_header(report));
    out.push_str(&render_describe(report));
    out.push_str(&render_frequencies(report, head));
    out.push_str(&render_brand_and_vendor_queries(report, head));
    out.push_str(&render_inventory_queries(report, head));
    out.push_str(&render_statistics(report));
    out.push_str(&render_undefined(report));

    out
}

fn render_report_header(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("\n📊 ");
    out.push_str(&"Vendor Performance Analysis".bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push_str(&format!("Source:    {}\n", report.source_table));
    out.push_str(&format!("Rows:      {}\n", report.row_count));
    out.push_str(&format!(
        "Profitable rows: {}\n",
        report.profitable.rows
    ));
    out.push_str(&format!("Generated: {}\n", report.generated_at));
    out.push_str(RULE);
    out
}

fn render_describe(report: &AnalysisReport) -> String {
    let mut out = String::new();
    if report.row_count == 0 {
        return out;
    }

    out.push_str("\nColumn Statistics:\n");
    out.push_str(&format!(
        "  {:<24} {:>14} {:>14} {:>14} {:>14}\n",
        "column", "mean", "median", "min", "max"
    ));
    for summary in &report.describe {
        out.push_str(&format!(
            "  {:<24} {:>14} {:>14} {:>14} {:>14}\n",
            summary.column,
            format_opt(summary.mean),
            format_opt(summary.median),
            format_opt(summary.min),
            format_opt(summary.max)
        ));
    }
    out
}

fn render_frequencies(report: &AnalysisReport, head: usize) -> String {
    let mut out = String::new();

    if !report.top_vendors_by_frequency.is_empty() {
        out.push_str("\nMost Frequent Vendors:\n");
        for entry in report.top_vendors_by_frequency.iter().take(head) {
            out.push_str(&format!("  {:>5}  {}\n", entry.count, entry.value));
        }
    }
    if !report.top_products_by_frequency.is_empty() {
        out.push_str("\nMost Frequent Products:\n");
        for entry in report.top_products_by_frequency.iter().take(head) {
            out.push_str(&format!("  {:>5}  {}\n", entry.count, entry.value));
        }
    }
    out
}

fn render_brand_and_vendor_queries(report: &AnalysisReport, head: usize) -> String {
    let mut out = String::new();

    let promo = &report.promo_candidates;
    out.push_str(&format!(
        "\nPromotion Candidates: {} (sales median {}, margin median {})\n",
        promo.rows.len(),
        format_opt(promo.sales_median),
        format_opt(promo.margin_median)
    ));
    for row in promo.rows.iter().take(head) {
        out.push_str(&format!(
            "  {} / {}: sales {:.2}, margin {:.2}%\n",
            row.vendor_name, row.description, row.total_sales_dollars, row.profit_margin
        ));
    }

    if !report.top_brands_by_sales.is_empty() {
        out.push_str("\nTop Brands by Sales:\n");
        for group in report.top_brands_by_sales.iter().take(head) {
            out.push_str(&format!("  {:>16}  {}\n", format_money(group.total), group.label()));
        }
    }

    if !report.vendor_purchase_concentration.is_empty() {
        out.push_str("\nVendor Purchase Concentration:\n");
        for entry in report.vendor_purchase_concentration.iter().take(head) {
            out.push_str(&format!(
                "  {:>6.2}% (cum {:>6.2}%)  {}\n",
                entry.percent, entry.cumulative_percent, entry.label
            ));
        }
    }
    out
}

fn render_inventory_queries(report: &AnalysisReport, head: usize) -> String {
    let mut out = String::new();

    if !report.bulk_purchase_effect.is_empty() {
        out.push_str("\nUnit Price by Order Size:\n");
        for bucket in &report.bulk_purchase_effect {
            out.push_str(&format!(
                "  {:<7} {:>6} rows, mean price {}\n",
                format!("{:?}", bucket.bucket),
                bucket.count,
                format_opt(bucket.mean_price)
            ));
        }
    }

    if !report.low_turnover.is_empty() {
        out.push_str("\nLowest Stock Turnover:\n");
        for row in report.low_turnover.iter().take(head) {
            out.push_str(&format!(
                "  {:>8.3}  {} / {}\n",
                row.stock_turnover, row.vendor_name, row.description
            ));
        }
    }

    if !report.unsold_inventory.is_empty() {
        let total: f64 = report.unsold_inventory.iter().map(|v| v.value).sum();
        out.push_str(&format!(
            "\nUnsold Inventory Value: {}\n",
            format_money(total).bold()
        ));
        for vendor in report.unsold_inventory.iter().take(head) {
            out.push_str(&format!("  {:>16}  {}\n", format_money(vendor.value), vendor.vendor_name));
        }
    }
    out
}

fn render_statistics(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("\nProfit Margin Statistics:\n");

    if let Estimate::Computed { value } = &report.margin_intervals {
        out.push_str(&format!(
            "  Top vendors (margin >= {:.2}):   {}\n",
            value.upper_threshold,
            format_interval(&value.top)
        ));
        out.push_str(&format!(
            "  Low vendors (margin <= {:.2}):   {}\n",
            value.lower_threshold,
            format_interval(&value.low)
        ));
    }

    if let Estimate::Computed { value } = &report.margin_hypothesis {
        out.push_str(&format!(
            "  Welch t-test: t = {:.4}, df = {:.2}, p = {:.4} ({} vs {} rows)\n",
            value.test.t_statistic,
            value.test.degrees_of_freedom,
            value.test.p_value,
            value.top_count,
            value.low_count
        ));
        let verdict = if value.reject_null {
            format!("  Reject H0 at alpha {}: margins differ", value.alpha).yellow()
        } else {
            format!("  Fail to reject H0 at alpha {}", value.alpha).normal()
        };
        out.push_str(&verdict.to_string());
        out.push('\n');
    }
    out
}

fn render_undefined(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let entries = report.undefined_entries();
    if entries.is_empty() {
        return out;
    }

    out.push('\n');
    out.push_str(RULE);
    for entry in entries {
        out.push_str(&format!("⚠️  Undefined: {}", entry).yellow().to_string());
        out.push('\n');
    }
    out
}

/// Render a consistency report and the gate verdict
pub fn render_terminal_consistency(report: &ConsistencyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n🔎 {}\n", format!("Table: {}", report.table).bold()));
    out.push_str(RULE);
    out.push_str(&format!("Rows: {}\n\n", report.rows));
    out.push_str(&format!("  {:<28} {:<8} {:>8}\n", "column", "type", "missing"));

    for column in &report.columns {
        let missing = if column.null_count > 0 {
            column.null_count.to_string().red().to_string()
        } else {
            column.null_count.to_string()
        };
        out.push_str(&format!(
            "  {:<28} {:<8} {:>8}\n",
            column.name,
            column.inferred_type.to_string(),
            missing
        ));
    }

    out.push('\n');
    out.push_str(RULE);
    let problems = report.gate_problems();
    let status = if problems.is_empty() {
        "✅ GATE: PASSED".green().bold()
    } else {
        format!("❌ GATE: FAILED ({} problems)", problems.len()).red().bold()
    };
    out.push_str(&status.to_string());
    out.push('\n');
    for problem in problems {
        out.push_str(&format!("  - {}\n", problem));
    }
    out
}

/// Render the table inventory
pub fn render_terminal_inventory(tables: &[TableInfo]) -> String {
    let mut out = String::new();
    out.push_str("\n🗄  ");
    out.push_str(&"Tables".bold().to_string());
    out.push('\n');
    out.push_str(RULE);

    if tables.is_empty() {
        out.push_str("(no tables)\n");
        return out;
    }
    for table in tables {
        out.push_str(&format!(
            "  {:<32} {:>10} rows, {} columns\n",
            table.name,
            table.rows,
            table.columns.len()
        ));
    }
    out
}

/// Render the first rows of a table as aligned text
pub fn render_table_head(name: &str, table: &Table) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", name.bold()));

    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| truncate(&cell.to_string(), 24)).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count().min(24)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", truncate(column, 24), width = width))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ")));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect();
        out.push_str(&format!("  {}\n", line.join("  ")));
    }
    if table.is_empty() {
        out.push_str("  (empty)\n");
    }
    out
}

/// Render the ingestion results
pub fn render_terminal_ingest(summaries: &[IngestSummary]) -> String {
    let mut out = String::new();
    out.push_str("\n📥 ");
    out.push_str(&"Ingestion Summary".bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    for summary in summaries {
        out.push_str(&format!(
            "  {:<24} {:>10} rows in {} chunks\n",
            summary.table, summary.rows, summary.chunks
        ));
    }
    let total: usize = summaries.iter().map(|s| s.rows).sum();
    out.push_str(&format!("Total: {} rows\n", total));
    out
}

/// Render the summary builder results
pub fn render_terminal_summary(report: &SummaryReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "✓ {} vendor/brand rows across {} vendors ({} purchase, {} sales records)\n",
        report.rows, report.vendors, report.purchase_records, report.sales_records
    ));
    if report.skipped_records > 0 {
        out.push_str(
            &format!("⚠️  Skipped {} records without vendor or brand", report.skipped_records)
                .yellow()
                .to_string(),
        );
        out.push('\n');
    }
    out
}

/// Render the metric derivation results
pub fn render_terminal_derivation(report: &DerivationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("✓ Derived metrics for {} rows\n", report.rows));

    for column in &report.missing_columns {
        out.push_str(&format!("⚠️  Missing column {} (all zero)", column).yellow().to_string());
        out.push('\n');
    }
    for (column, count) in report.defaulted.iter().filter(|(_, count)| **count > 0) {
        out.push_str(&format!("  {:<24} {:>8} values defaulted to 0\n", column, count));
    }
    out
}

fn format_interval(estimate: &Estimate<ConfidenceInterval>) -> String {
    match estimate {
        Estimate::Computed { value } => format!(
            "mean {:.2}, {:.0}% CI [{:.2}, {:.2}] (n = {})",
            value.mean,
            value.confidence * 100.0,
            value.lower,
            value.upper,
            value.n
        ),
        Estimate::Undefined { reason } => format!("undefined ({})", reason),
    }
}

fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn format_money(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
