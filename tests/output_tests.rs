use pretty_assertions::assert_eq;
use std::fs;
use vendor_perf::analytics::{run_analysis, AnalysisReport, Estimate};
use vendor_perf::metrics::VendorPerformance;
use vendor_perf::output::terminal::render_terminal_report;
use vendor_perf::output::{
    read_report, render_chart, report_charts, report_to_string, write_report, Chart, RenderSink,
    SvgSink,
};
use vendor_perf::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use tempfile::NamedTempFile;

fn create_test_report() -> AnalysisReport {
    let rows: Vec<VendorPerformance> = (1..=6u32)
        .map(|i| {
            let x = f64::from(i);
            VendorPerformance::from_base(
                format!("Vendor <{}>", i),
                i.to_string(),
                format!("Product {}", i),
                [10.0 * x, 100.0 * x, 8.0 * x, 120.0 * x - x * x, 0.0, 0.0, 0.0, 15.0, 750.0, 10.0],
            )
        })
        .collect();
    run_analysis(&rows, &AnalysisConfig::default(), "vendor_sales_summary_cleaned")
}

#[test]
fn test_write_and_read_report() {
    let report = create_test_report();
    let temp_file = NamedTempFile::new().unwrap();

    write_report(&report, temp_file.path()).unwrap();
    let loaded = read_report(temp_file.path()).unwrap();

    assert_eq!(loaded.version, SCHEMA_VERSION);
    assert_eq!(loaded.generated_at, report.generated_at);
    assert_eq!(loaded.row_count, 6);
    assert_eq!(
        loaded
            .top_brands_by_sales
            .iter()
            .map(|g| g.keys.clone())
            .collect::<Vec<_>>(),
        report
            .top_brands_by_sales
            .iter()
            .map(|g| g.keys.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!(loaded.undefined_entries(), report.undefined_entries());
}

#[test]
fn test_undefined_statistics_are_tagged() {
    let report = run_analysis(&[], &AnalysisConfig::default(), "empty");
    let json = report_to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["margin_hypothesis"]["status"], "undefined");
    assert!(value["margin_hypothesis"]["reason"].is_string());
    assert_eq!(value["version"], SCHEMA_VERSION);
}

#[test]
fn test_computed_statistics_are_tagged() {
    let report = create_test_report();
    let value: serde_json::Value = serde_json::from_str(&report_to_string(&report).unwrap()).unwrap();

    assert!(matches!(report.margin_intervals, Estimate::Computed { .. }));
    assert_eq!(value["margin_intervals"]["status"], "computed");
    assert!(value["margin_intervals"]["value"]["upper_threshold"].is_number());
}

#[test]
fn test_svg_sink_writes_every_chart() {
    let report = create_test_report();
    let temp_dir = tempfile::tempdir().unwrap();
    let charts_dir = temp_dir.path().join("charts");
    let mut sink = SvgSink::new(&charts_dir, 800);

    for (name, chart) in report_charts(&report, 10) {
        sink.render(&name, &chart).unwrap();
    }

    assert_eq!(sink.written().len(), 5);
    let share = fs::read_to_string(charts_dir.join("vendor_purchase_share.svg")).unwrap();
    assert!(share.starts_with("<svg"));
    assert!(share.contains("Vendor Share of Purchases"));
    // Labels are XML-escaped
    assert!(share.contains("Vendor &lt;6&gt;"));
    assert!(!share.contains("Vendor <6>"));
}

#[test]
fn test_concentration_chart_has_overlay() {
    let report = create_test_report();
    let charts = report_charts(&report, 10);
    let (_, chart) = charts
        .iter()
        .find(|(name, _)| name == "vendor_purchase_concentration")
        .unwrap();

    assert_eq!(chart.overlay.as_ref().map(Vec::len), Some(6));
    let svg = render_chart(chart, 800);
    assert!(svg.contains("<polyline"));
}

#[test]
fn test_empty_chart_says_no_data() {
    let chart = Chart::bar("Nothing", vec![], vec![]);
    let svg = render_chart(&chart, 600);

    assert!(svg.contains("No data"));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn test_terminal_report_mentions_vendors() {
    let report = create_test_report();
    let text = render_terminal_report(&report, 3);

    assert!(text.contains("Vendor <6>"));
    assert!(text.contains("Welch t-test"));
}
