//! Descriptive statistics and Student-t inference.
//!
//! Percentiles use linear interpolation between closest ranks. Variances
//! are sample variances (n - 1 denominator).

use crate::utils::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const BETA_MAX_ITERATIONS: usize = 300;
const BETA_EPSILON: f64 = 1e-14;
const FLOAT_MIN: f64 = 1e-300;
const PPF_BISECTIONS: usize = 200;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample variance, `None` below two values
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Standard error of the mean
pub fn standard_error(values: &[f64]) -> Option<f64> {
    sample_std(values).map(|s| s / (values.len() as f64).sqrt())
}

/// Percentile `q` (0..=100) of already sorted values
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Percentile `q` (0..=100) of unsorted values
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, q)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Pearson correlation; `None` when either side has zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mx) * (y - my);
        var_x += (x - mx).powi(2);
        var_y += (y - my).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((covariance / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Natural log of the gamma function (Lanczos approximation), x > 0
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut series = LANCZOS_COEFFICIENTS[0];
    for (i, coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        series += coefficient / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Regularized incomplete beta function I_x(a, b)
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Continued fraction for the incomplete beta (modified Lentz)
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let guard = |v: f64| if v.abs() < FLOAT_MIN { FLOAT_MIN } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=BETA_MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < BETA_EPSILON {
            break;
        }
    }
    h
}

/// Student-t cumulative distribution function
pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(x, df / 2.0, 0.5);
    if t >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Student-t quantile function (inverse CDF) by bisection
///
/// # Errors
/// * `AnalysisError::StatisticalUndefined` - If `p` is outside (0, 1) or `df` is not positive
pub fn student_t_ppf(p: f64, df: f64) -> Result<f64, AnalysisError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(AnalysisError::StatisticalUndefined(format!(
            "probability {} outside (0, 1)",
            p
        )));
    }
    if !(df > 0.0) {
        return Err(AnalysisError::StatisticalUndefined(format!(
            "degrees of freedom {} must be positive",
            df
        )));
    }

    let mut low = -1.0;
    let mut high = 1.0;
    while student_t_cdf(low, df) > p {
        low *= 2.0;
    }
    while student_t_cdf(high, df) < p {
        high *= 2.0;
    }

    for _ in 0..PPF_BISECTIONS {
        let mid = 0.5 * (low + high);
        if student_t_cdf(mid, df) < p {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(0.5 * (low + high))
}

/// A statistic, or the reason it could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Estimate<T> {
    Computed { value: T },
    Undefined { reason: String },
}

impl<T> Estimate<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Estimate::Computed { value } => Some(value),
            Estimate::Undefined { .. } => None,
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Estimate<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Estimate::Computed { value },
            Err(AnalysisError::StatisticalUndefined(reason)) => Estimate::Undefined { reason },
        }
    }
}

/// Mean with a two-sided Student-t interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub n: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
}

/// Student-t confidence interval for the mean of `values`
///
/// Uses the sample standard error and `n - 1` degrees of freedom.
///
/// # Errors
/// * `AnalysisError::StatisticalUndefined` - With fewer than two values
pub fn confidence_interval(values: &[f64], confidence: f64) -> Result<ConfidenceInterval, AnalysisError> {
    let n = values.len();
    let (Some(m), Some(se)) = (mean(values), standard_error(values)) else {
        return Err(AnalysisError::StatisticalUndefined(format!(
            "confidence interval needs at least 2 samples, got {}",
            n
        )));
    };
    let critical = student_t_ppf((1.0 + confidence) / 2.0, (n - 1) as f64)?;
    Ok(ConfidenceInterval {
        n,
        mean: m,
        lower: m - critical * se,
        upper: m + critical * se,
        confidence,
    })
}

/// Result of Welch's unequal-variance t-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelchTest {
    pub t_statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub degrees_of_freedom: f64,
}

/// Welch's two-sample t-test of `a` against `b`
///
/// # Errors
/// * `AnalysisError::StatisticalUndefined` - If a sample has fewer than two
///   values or both samples have zero variance
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<WelchTest, AnalysisError> {
    let (Some(var_a), Some(var_b)) = (sample_variance(a), sample_variance(b)) else {
        return Err(AnalysisError::StatisticalUndefined(format!(
            "t-test needs at least 2 samples per group, got {} and {}",
            a.len(),
            b.len()
        )));
    };
    let (Some(mean_a), Some(mean_b)) = (mean(a), mean(b)) else {
        return Err(AnalysisError::StatisticalUndefined("empty sample".to_string()));
    };

    let se_a = var_a / a.len() as f64;
    let se_b = var_b / b.len() as f64;
    let pooled = se_a + se_b;
    if pooled == 0.0 {
        return Err(AnalysisError::StatisticalUndefined(
            "t-test undefined: both groups have zero variance".to_string(),
        ));
    }

    let t_statistic = (mean_a - mean_b) / pooled.sqrt();
    let degrees_of_freedom = pooled.powi(2)
        / (se_a.powi(2) / (a.len() - 1) as f64 + se_b.powi(2) / (b.len() - 1) as f64);
    let x = degrees_of_freedom / (degrees_of_freedom + t_statistic * t_statistic);
    let p_value = regularized_incomplete_beta(x, degrees_of_freedom / 2.0, 0.5);

    Ok(WelchTest {
        t_statistic,
        p_value,
        degrees_of_freedom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_percentile_linear() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 50.0), Some(2.5));
        assert_eq!(percentile(&values, 75.0), Some(3.25));
        assert_eq!(percentile(&values, 25.0), Some(1.75));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_median_unsorted() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_sample_variance() {
        assert_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(2.5));
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn test_ln_gamma_factorials() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-12));
        assert!(close(ln_gamma(5.0), 24f64.ln(), 1e-10));
        assert!(close(ln_gamma(0.5), PI.sqrt().ln(), 1e-10));
    }

    #[test]
    fn test_t_cdf_symmetry() {
        assert!(close(student_t_cdf(0.0, 5.0), 0.5, 1e-12));
        let upper = student_t_cdf(1.3, 7.0);
        let lower = student_t_cdf(-1.3, 7.0);
        assert!(close(upper + lower, 1.0, 1e-12));
    }

    #[test]
    fn test_t_ppf_known_values() {
        assert!(close(student_t_ppf(0.975, 9.0).unwrap(), 2.262_157, 1e-5));
        assert!(close(student_t_ppf(0.975, 1.0).unwrap(), 12.706_205, 1e-4));
        assert!(close(student_t_ppf(0.5, 3.0).unwrap(), 0.0, 1e-6));
        assert!(student_t_ppf(1.0, 3.0).is_err());
    }

    #[test]
    fn test_confidence_interval() {
        let ci = confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();
        // 3 +/- 2.776445 * sqrt(2.5)/sqrt(5)
        assert!(close(ci.mean, 3.0, 1e-12));
        assert!(close(ci.lower, 1.036_757, 1e-5));
        assert!(close(ci.upper, 4.963_243, 1e-5));
        assert_eq!(ci.n, 5);
    }

    #[test]
    fn test_confidence_interval_too_small() {
        assert!(matches!(
            confidence_interval(&[1.0], 0.95),
            Err(AnalysisError::StatisticalUndefined(_))
        ));
    }

    #[test]
    fn test_welch_known_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];

        let result = welch_t_test(&a, &b).unwrap();

        assert!(close(result.t_statistic, -1.897_366_596, 1e-8));
        assert!(close(result.degrees_of_freedom, 5.882_352_9, 1e-6));
        assert!(close(result.p_value, 0.107_53, 1e-4));
    }

    #[test]
    fn test_welch_zero_variance() {
        let result = welch_t_test(&[2.0, 2.0], &[3.0, 3.0, 3.0]);
        assert!(matches!(result, Err(AnalysisError::StatisticalUndefined(_))));
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0];
        assert!(close(pearson(&xs, &[2.0, 4.0, 6.0]).unwrap(), 1.0, 1e-12));
        assert!(close(pearson(&xs, &[3.0, 2.0, 1.0]).unwrap(), -1.0, 1e-12));
        assert_eq!(pearson(&xs, &[1.0, 1.0, 1.0]), None);
    }
}
