//! Chart rendering.
//!
//! A `Chart` is plain data (categories, values and an optional cumulative
//! overlay). Sinks turn charts into files; the SVG sink writes the
//! markup directly.

use super::svg::write_svg;
use crate::analytics::queries::OTHERS_LABEL;
use crate::analytics::AnalysisReport;
use crate::utils::error::OutputError;
use log::debug;
use std::path::PathBuf;

const PALETTE: [&str; 10] = [
    "rgb(70, 130, 180)",  // Steel Blue
    "rgb(255, 140, 0)",   // Dark Orange
    "rgb(34, 139, 34)",   // Forest Green
    "rgb(220, 20, 60)",   // Crimson
    "rgb(138, 43, 226)",  // Blue Violet
    "rgb(139, 69, 19)",   // Saddle Brown
    "rgb(255, 105, 180)", // Hot Pink
    "rgb(128, 128, 0)",   // Olive
    "rgb(0, 206, 209)",   // Dark Turquoise
    "rgb(100, 149, 237)", // Cornflower Blue
];
const OTHERS_COLOR: &str = "rgb(169, 169, 169)";
const OVERLAY_COLOR: &str = "rgb(255, 140, 0)";

const TITLE_HEIGHT: usize = 40;
const BAR_HEIGHT: usize = 24;
const BAR_GAP: usize = 6;
const LABEL_WIDTH: usize = 260;
const VALUE_MARGIN: usize = 90;

/// How bar and slice values are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// 1234567 -> "1.23M"
    Millions,
    /// 12.345 -> "12.35%"
    Percent,
    /// 12.345 -> "12.35"
    Plain,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Millions => format!("{:.2}M", value / 1e6),
            ValueFormat::Percent => format!("{:.2}%", value),
            ValueFormat::Plain => format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal bars, largest first
    Bar,
    /// Ring of slices proportional to the values
    Donut,
}

/// Data handed to a render sink
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    /// Cumulative percentage line drawn over bar charts (0..=100 scale)
    pub overlay: Option<Vec<f64>>,
    pub format: ValueFormat,
}

impl Chart {
    pub fn bar(title: impl Into<String>, categories: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            kind: ChartKind::Bar,
            categories,
            values,
            overlay: None,
            format: ValueFormat::Plain,
        }
    }

    pub fn donut(title: impl Into<String>, categories: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Donut,
            ..Self::bar(title, categories, values)
        }
    }

    pub fn with_overlay(mut self, overlay: Vec<f64>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }
}

/// Consumer of charts
///
/// Rendering is fire-and-forget for the pipeline: callers log failures and
/// carry on.
pub trait RenderSink {
    fn render(&mut self, name: &str, chart: &Chart) -> Result<(), OutputError>;
}

/// Writes each chart to `<dir>/<name>.svg`
#[derive(Debug, Clone)]
pub struct SvgSink {
    dir: PathBuf,
    width: usize,
    written: Vec<PathBuf>,
}

impl SvgSink {
    pub fn new(dir: impl Into<PathBuf>, width: usize) -> Self {
        Self {
            dir: dir.into(),
            width,
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RenderSink for SvgSink {
    fn render(&mut self, name: &str, chart: &Chart) -> Result<(), OutputError> {
        let path = self.dir.join(format!("{}.svg", name));
        write_svg(&render_chart(chart, self.width), &path)?;
        self.written.push(path);
        Ok(())
    }
}

/// The standard chart set for a report, keyed by file stem
pub fn report_charts(report: &AnalysisReport, top_n: usize) -> Vec<(String, Chart)> {
    let top_brands = &report.top_brands_by_sales;
    let concentration = &report.vendor_purchase_concentration;
    let share = &report.vendor_purchase_share;
    let unsold: Vec<_> = report.unsold_inventory.iter().take(top_n).collect();

    vec![
        (
            "top_brands_by_sales".to_string(),
            Chart::bar(
                format!("Top {} Brands by Sales", top_brands.len()),
                top_brands.iter().map(|g| g.label().to_string()).collect(),
                top_brands.iter().map(|g| g.total).collect(),
            )
            .with_format(ValueFormat::Millions),
        ),
        (
            "vendor_purchase_concentration".to_string(),
            Chart::bar(
                "Vendor Purchase Contribution",
                concentration.iter().map(|s| s.label.clone()).collect(),
                concentration.iter().map(|s| s.percent).collect(),
            )
            .with_overlay(concentration.iter().map(|s| s.cumulative_percent).collect())
            .with_format(ValueFormat::Percent),
        ),
        (
            "vendor_purchase_share".to_string(),
            Chart::donut(
                "Vendor Share of Purchases",
                share.iter().map(|s| s.label.clone()).collect(),
                share.iter().map(|s| s.total).collect(),
            )
            .with_format(ValueFormat::Millions),
        ),
        (
            "bulk_purchase_effect".to_string(),
            Chart::bar(
                "Mean Purchase Price by Order Size",
                report
                    .bulk_purchase_effect
                    .iter()
                    .map(|b| format!("{:?}", b.bucket))
                    .collect(),
                report
                    .bulk_purchase_effect
                    .iter()
                    .map(|b| b.mean_price.unwrap_or(0.0))
                    .collect(),
            ),
        ),
        (
            "unsold_inventory".to_string(),
            Chart::bar(
                "Unsold Inventory Value by Vendor",
                unsold.iter().map(|v| v.vendor_name.clone()).collect(),
                unsold.iter().map(|v| v.value).collect(),
            )
            .with_format(ValueFormat::Millions),
        ),
    ]
}

/// Render a chart to an SVG document
pub fn render_chart(chart: &Chart, width: usize) -> String {
    let body_height = match chart.kind {
        ChartKind::Bar => chart.categories.len().max(1) * (BAR_HEIGHT + BAR_GAP) + 40,
        ChartKind::Donut => width.min(600).max(chart.categories.len() * 22 + 40),
    };
    let height = TITLE_HEIGHT + body_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, height, width, height
    ));
    svg.push_str(r#"<style>text { font: 12px sans-serif; } .bar:hover { opacity: 0.8; }</style>"#);
    svg.push_str(&format!(
        r#"<text x="{}" y="24" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&chart.title)
    ));

    if chart.categories.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" fill="gray">No data</text>"#,
            width / 2,
            TITLE_HEIGHT + 20
        ));
    } else {
        match chart.kind {
            ChartKind::Bar => render_bars(&mut svg, chart, width),
            ChartKind::Donut => render_donut(&mut svg, chart, width, body_height),
        }
    }

    svg.push_str("</svg>");
    debug!("Rendered chart '{}' ({} bytes)", chart.title, svg.len());
    svg
}

fn render_bars(out: &mut String, chart: &Chart, width: usize) {
    let plot_width = width.saturating_sub(LABEL_WIDTH + VALUE_MARGIN).max(50) as f64;
    let max_value = chart.values.iter().copied().fold(0.0_f64, f64::max);
    let scale = if max_value > 0.0 { plot_width / max_value } else { 0.0 };

    for (i, (category, value)) in chart.categories.iter().zip(&chart.values).enumerate() {
        let y = TITLE_HEIGHT + i * (BAR_HEIGHT + BAR_GAP);
        let bar_width = (value.max(0.0) * scale).max(0.0);
        let label = escape_xml(&truncate_label(category, LABEL_WIDTH));

        out.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end">{}</text>"#,
            LABEL_WIDTH - 8,
            y + 16,
            label
        ));
        out.push_str(&format!(
            r#"<rect class="bar" x="{}" y="{}" width="{:.2}" height="{}" fill="{}"><title>{}: {}</title></rect>"#,
            LABEL_WIDTH,
            y,
            bar_width,
            BAR_HEIGHT,
            PALETTE[0],
            label,
            chart.format.format(*value)
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{}">{}</text>"#,
            LABEL_WIDTH as f64 + bar_width + 4.0,
            y + 16,
            chart.format.format(*value)
        ));
    }

    if let Some(overlay) = &chart.overlay {
        // Overlay shares the bar rows on a fixed 0..100 axis
        let points: Vec<String> = overlay
            .iter()
            .enumerate()
            .map(|(i, pct)| {
                let x = LABEL_WIDTH as f64 + pct.clamp(0.0, 100.0) / 100.0 * plot_width;
                let y = TITLE_HEIGHT + i * (BAR_HEIGHT + BAR_GAP) + BAR_HEIGHT / 2;
                format!("{:.2},{}", x, y)
            })
            .collect();
        out.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            points.join(" "),
            OVERLAY_COLOR
        ));
        for point in &points {
            if let Some((x, y)) = point.split_once(',') {
                out.push_str(&format!(
                    r#"<circle cx="{}" cy="{}" r="3" fill="{}"/>"#,
                    x, y, OVERLAY_COLOR
                ));
            }
        }
    }
}

fn render_donut(out: &mut String, chart: &Chart, width: usize, body_height: usize) {
    let total: f64 = chart.values.iter().map(|v| v.max(0.0)).sum();
    let diameter = (width / 2).min(body_height).saturating_sub(40) as f64;
    let radius = diameter / 2.0;
    let thickness = radius * 0.3;
    let ring_radius = radius - thickness / 2.0;
    let cx = 20.0 + radius;
    let cy = TITLE_HEIGHT as f64 + 20.0 + radius;

    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, (category, value)) in chart.categories.iter().zip(&chart.values).enumerate() {
        let color = slice_color(i, category);
        let fraction = if total > 0.0 { value.max(0.0) / total } else { 0.0 };

        if fraction >= 0.9999 {
            out.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
                cx, cy, ring_radius, color, thickness
            ));
        } else if fraction > 0.0 {
            let sweep = fraction * std::f64::consts::TAU;
            let (x0, y0) = (cx + ring_radius * angle.cos(), cy + ring_radius * angle.sin());
            let end = angle + sweep;
            let (x1, y1) = (cx + ring_radius * end.cos(), cy + ring_radius * end.sin());
            let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
            out.push_str(&format!(
                r#"<path d="M {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.2}"><title>{}: {:.1}%</title></path>"#,
                x0,
                y0,
                ring_radius,
                ring_radius,
                large_arc,
                x1,
                y1,
                color,
                thickness,
                escape_xml(category),
                fraction * 100.0
            ));
            angle = end;
        }

        // Legend
        let lx = (cx + radius + 40.0) as usize;
        let ly = TITLE_HEIGHT + 20 + i * 22;
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="14" height="14" fill="{}" rx="2"/>"#,
            lx, ly, color
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}">{} ({:.1}%, {})</text>"#,
            lx + 20,
            ly + 12,
            escape_xml(category),
            fraction * 100.0,
            chart.format.format(*value)
        ));
    }
}

fn slice_color(index: usize, category: &str) -> &'static str {
    if category == OTHERS_LABEL {
        OTHERS_COLOR
    } else {
        PALETTE[index % PALETTE.len()]
    }
}

/// Shorten a label to fit roughly `width` pixels
fn truncate_label(label: &str, width: usize) -> String {
    const CHAR_WIDTH: usize = 7;
    let max_chars = width / CHAR_WIDTH;
    if label.chars().count() > max_chars && max_chars > 3 {
        let kept: String = label.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    } else {
        label.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
