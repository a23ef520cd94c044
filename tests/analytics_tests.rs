use pretty_assertions::assert_eq;
use vendor_perf::analytics::queries::{
    concentration_share, extremes, promo_candidates, quantile_buckets, share_with_others,
    top_n_by,
};
use vendor_perf::analytics::stats::{confidence_interval, student_t_ppf, welch_t_test};
use vendor_perf::analytics::{
    run_analysis, Estimate, GroupKey, Metric, Order, QuantityBucket, OTHERS_LABEL,
};
use vendor_perf::metrics::VendorPerformance;
use vendor_perf::utils::config::AnalysisConfig;

/// Row with purchase quantity/dollars and sales quantity/dollars
fn row(vendor: &str, description: &str, purchase: (f64, f64), sales: (f64, f64)) -> VendorPerformance {
    VendorPerformance::from_base(
        vendor.to_string(),
        description.replace(' ', "-"),
        description.to_string(),
        [purchase.0, purchase.1, sales.0, sales.1, 0.0, 0.0, 0.0, 10.0, 750.0, 1.0],
    )
}

fn twelve_vendors() -> Vec<VendorPerformance> {
    (1..=12)
        .map(|i: u32| {
            let x = f64::from(i);
            row(
                &format!("Vendor {:02}", i),
                &format!("Product {:02}", i),
                (10.0 * x, 100.0 * x),
                (5.0 * x, 90.0 * x + x * x),
            )
        })
        .collect()
}

#[test]
fn test_gross_profit_identity() {
    for r in twelve_vendors() {
        assert_eq!(r.total_gross_profit, r.total_sales_dollars - r.total_purchase_dollars);
    }
}

#[test]
fn test_zero_sales_means_zero_margin() {
    let r = row("A", "Wine", (10.0, 100.0), (0.0, 0.0));
    assert_eq!(r.profit_margin, 0.0);
    assert_eq!(r.total_gross_profit, -100.0);
}

#[test]
fn test_share_with_others_sums_to_total() {
    let rows = twelve_vendors();
    let slices = share_with_others(&rows, GroupKey::Vendor, Metric::TotalPurchaseDollars, 10);

    assert_eq!(slices.len(), 11);
    assert_eq!(slices[0].label, "Vendor 12");
    assert_eq!(slices[10].label, OTHERS_LABEL);
    // Vendors 01 and 02 are left over
    assert_eq!(slices[10].total, 300.0);

    let percent: f64 = slices.iter().map(|s| s.percent).sum();
    assert!((percent - 100.0).abs() < 1e-9);
}

#[test]
fn test_no_others_slice_when_all_groups_fit() {
    let rows = twelve_vendors();
    let slices = share_with_others(&rows, GroupKey::Vendor, Metric::TotalPurchaseDollars, 12);

    assert_eq!(slices.len(), 12);
    assert!(slices.iter().all(|s| s.label != OTHERS_LABEL));
}

#[test]
fn test_share_sums_to_total_without_others() {
    let rows = twelve_vendors();

    for n in [12, 20] {
        let slices = share_with_others(&rows, GroupKey::Vendor, Metric::TotalPurchaseDollars, n);
        let percent: f64 = slices.iter().map(|s| s.percent).sum();

        assert!(slices.iter().all(|s| s.label != OTHERS_LABEL));
        assert!((percent - 100.0).abs() < 1e-9, "n = {}: {}", n, percent);
    }
}

#[test]
fn test_concentration_reaches_total_when_all_groups_fit() {
    let rows = twelve_vendors();
    let shares = concentration_share(&rows, GroupKey::Vendor, Metric::TotalPurchaseDollars, 12);

    assert_eq!(shares.len(), 12);
    let last = shares.last().unwrap();
    assert!((last.cumulative_percent - 100.0).abs() < 1e-9);
}

#[test]
fn test_concentration_cumulative_over_slice() {
    let rows = twelve_vendors();
    let shares = concentration_share(&rows, GroupKey::Vendor, Metric::TotalPurchaseDollars, 3);

    assert_eq!(shares.len(), 3);
    let expected: f64 = shares.iter().map(|s| s.percent).sum();
    assert!((shares[2].cumulative_percent - expected).abs() < 1e-9);
    assert!(shares[2].cumulative_percent < 100.0);
}

#[test]
fn test_top_brands_grouped_by_description() {
    let mut rows = twelve_vendors();
    // Same brand/description sold by a second vendor
    rows.push(row("Vendor 99", "Product 01", (1.0, 1.0), (1.0, 5000.0)));

    let top = top_n_by(&rows, GroupKey::BrandDescription, Metric::TotalSalesDollars, 2);

    assert_eq!(top[0].label(), "Product 01");
    assert_eq!(top[0].total, 5000.0 + 91.0);
    assert_eq!(top.len(), 2);
}

#[test]
fn test_quantile_buckets_are_equal_sized() {
    let rows: Vec<VendorPerformance> = twelve_vendors().into_iter().take(9).collect();
    let buckets = quantile_buckets(&rows, Metric::TotalPurchaseQuantity, Metric::PurchasePrice);

    let sizes: Vec<(QuantityBucket, usize)> = buckets.iter().map(|b| (b.bucket, b.count)).collect();
    assert_eq!(
        sizes,
        vec![
            (QuantityBucket::Small, 3),
            (QuantityBucket::Medium, 3),
            (QuantityBucket::Large, 3)
        ]
    );
}

#[test]
fn test_extremes_ascending() {
    let rows = twelve_vendors();
    let lowest = extremes(&rows, Metric::TotalSalesDollars, Order::Ascending, 2);

    let vendors: Vec<&str> = lowest.iter().map(|r| r.vendor_name.as_str()).collect();
    assert_eq!(vendors, vec!["Vendor 01", "Vendor 02"]);
}

#[test]
fn test_promo_candidates_use_table_medians() {
    let rows = vec![
        row("Low", "A", (10.0, 10.0), (1.0, 20.0)),
        row("Mid", "B", (10.0, 50.0), (1.0, 60.0)),
        row("High", "C", (10.0, 90.0), (1.0, 100.0)),
    ];
    let promo = promo_candidates(&rows);

    assert_eq!(promo.sales_median, Some(60.0));
    assert_eq!(promo.rows.len(), 1);
    assert_eq!(promo.rows[0].vendor_name, "Low");
}

#[test]
fn test_t_quantiles() {
    assert!((student_t_ppf(0.975, 9.0).unwrap() - 2.26216).abs() < 1e-4);
    assert!((student_t_ppf(0.975, 4.0).unwrap() - 2.776445).abs() < 1e-4);
}

#[test]
fn test_confidence_interval_small_sample() {
    let ci = confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();

    assert_eq!(ci.n, 5);
    assert_eq!(ci.mean, 3.0);
    assert!((ci.lower - 1.0367568).abs() < 1e-4);
    assert!((ci.upper - 4.9632432).abs() < 1e-4);
}

#[test]
fn test_welch_statistics() {
    let test = welch_t_test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();

    assert!((test.t_statistic + 1.8973666).abs() < 1e-6);
    assert!((test.degrees_of_freedom - 5.88235).abs() < 1e-4);
    assert!((test.p_value - 0.10753).abs() < 1e-4);
}

#[test]
fn test_welch_single_sample_undefined() {
    assert!(welch_t_test(&[1.0], &[2.0, 3.0]).is_err());
}

#[test]
fn test_report_statistics_computed_for_larger_table() {
    let rows = twelve_vendors();
    let report = run_analysis(&rows, &AnalysisConfig::default(), "cleaned");

    assert_eq!(report.row_count, 12);
    assert!(matches!(report.margin_intervals, Estimate::Computed { .. }));
    assert!(matches!(report.margin_hypothesis, Estimate::Computed { .. }));
    assert!(report.undefined_entries().is_empty());
}

#[test]
fn test_report_on_empty_table_never_panics() {
    let report = run_analysis(&[], &AnalysisConfig::default(), "cleaned");

    assert_eq!(report.row_count, 0);
    assert!(report.top_brands_by_sales.is_empty());
    assert!(!report.undefined_entries().is_empty());
}
