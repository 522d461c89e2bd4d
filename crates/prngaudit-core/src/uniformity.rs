//! Second-order analysis of p-values produced by a randomness test battery.
//!
//! NIST SP 800-22 §4.2 evaluates a generator twice per test: the proportion of
//! sequences that pass at level `alpha`, and whether the p-values themselves
//! are uniformly distributed over [0, 1]. The second check bins the p-values
//! into ten equal intervals, computes a chi-square statistic against the
//! expected per-bin count, and converts it into a meta p-value with the
//! regularized upper incomplete gamma function `Q(9/2, chi2/2)`.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Gamma};

use crate::error::{AuditError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of equal-width histogram bins over [0, 1].
pub const BINS: usize = 10;

/// Degrees of freedom of the chi-square statistic (`BINS - 1`).
pub const DEGREES_OF_FREEDOM: f64 = (BINS - 1) as f64;

/// Meta p-values must exceed this for the p-values to count as uniform.
pub const UNIFORMITY_THRESHOLD: f64 = 0.0001;

/// Smallest sample NIST recommends for the uniformity check.
pub const MIN_RECOMMENDED_SAMPLES: usize = 55;

/// Default significance level of the first-order tests.
pub const DEFAULT_ALPHA: f64 = 0.01;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// How the expected per-bin count is derived.
///
/// The two modes answer different questions:
/// `SelfNormalized` asks whether the p-values at hand are uniform, while
/// `FixedBudget` asks whether they are distributed as if drawn from a
/// population of the declared number of trials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExpectedCount {
    /// `len(p_values) / 10`.
    SelfNormalized,
    /// `trials / 10`, independent of how many p-values were supplied.
    FixedBudget { trials: usize },
}

impl ExpectedCount {
    /// Expected count per bin for a sample of `sample_size` p-values.
    pub fn per_bin(&self, sample_size: usize) -> f64 {
        match self {
            Self::SelfNormalized => sample_size as f64 / BINS as f64,
            Self::FixedBudget { trials } => *trials as f64 / BINS as f64,
        }
    }
}

impl std::fmt::Display for ExpectedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfNormalized => write!(f, "self-normalized"),
            Self::FixedBudget { trials } => write!(f, "fixed-budget ({trials} trials)"),
        }
    }
}

/// Outcome of the uniformity-of-p-values check.
#[derive(Debug, Clone, Serialize)]
pub struct UniformityReport {
    /// Observed counts for [0,0.1), [0.1,0.2), …, [0.9,1.0].
    pub bin_counts: [u64; BINS],
    pub expected: ExpectedCount,
    pub expected_per_bin: f64,
    pub chi_square: f64,
    pub meta_p_value: f64,
    pub passed: bool,
    pub sample_size: usize,
    /// False when fewer than [`MIN_RECOMMENDED_SAMPLES`] p-values were supplied.
    pub reliable: bool,
}

/// Outcome of the proportion-of-passing-sequences check.
#[derive(Debug, Clone, Serialize)]
pub struct ProportionReport {
    pub alpha: f64,
    pub passing: usize,
    pub total: usize,
    pub proportion: f64,
    /// Acceptance interval `(1-alpha) ± 3*sqrt(alpha*(1-alpha)/m)`.
    pub interval: (f64, f64),
    pub passed: bool,
}

/// Both second-order checks for one test of the battery.
#[derive(Debug, Clone, Serialize)]
pub struct TestAssessment {
    /// Stable test key, e.g. `Frequency_Test`.
    pub key: String,
    pub uniformity: UniformityReport,
    pub proportion: ProportionReport,
    pub passed: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Regularized upper incomplete gamma function `Q(a, x)`.
///
/// `Q(a, 0) = 1` and `Q(a, inf) = 0`; negative `x` is treated as 0.
pub fn igamc(a: f64, x: f64) -> Result<f64> {
    let dist = Gamma::new(a, 1.0)
        .map_err(|_| AuditError::invalid_config("shape", a, "a finite value > 0"))?;
    if x.is_nan() {
        return Err(AuditError::invalid_input("igamc", x, "a non-NaN argument"));
    }
    Ok(dist.sf(x).clamp(0.0, 1.0))
}

/// Histogram bin for a p-value already known to lie in [0, 1].
///
/// Bins are half-open except the last, which also takes exactly 1.0.
pub fn bin_index(p: f64) -> usize {
    ((p * BINS as f64).floor() as usize).min(BINS - 1)
}

/// Reject empty samples and values outside [0, 1] (NaN included).
fn validate_p_values(p_values: &[f64], context: &str) -> Result<()> {
    if p_values.is_empty() {
        return Err(AuditError::insufficient(context, 1, 0));
    }
    if let Some((i, &p)) = p_values
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(AuditError::invalid_input(
            format!("p_values[{i}]"),
            p,
            "a value in [0, 1]",
        ));
    }
    Ok(())
}

/// Count p-values per bin.
pub fn histogram(p_values: &[f64]) -> [u64; BINS] {
    let mut counts = [0u64; BINS];
    for &p in p_values {
        counts[bin_index(p)] += 1;
    }
    counts
}

// ═══════════════════════════════════════════════════════════════════════════════
// Analyses
// ═══════════════════════════════════════════════════════════════════════════════

/// Test whether `p_values` are uniformly distributed over [0, 1].
pub fn evaluate_uniformity(p_values: &[f64], expected: ExpectedCount) -> Result<UniformityReport> {
    validate_p_values(p_values, "uniformity")?;

    let n = p_values.len();
    let expected_per_bin = expected.per_bin(n);
    if expected_per_bin <= 0.0 {
        return Err(AuditError::invalid_config(
            "expected_count_per_bin",
            expected_per_bin,
            "a value > 0",
        ));
    }

    let bin_counts = histogram(p_values);
    // Summed in fixed bin order so the statistic does not depend on input order.
    let chi_square: f64 = bin_counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected_per_bin;
            diff * diff / expected_per_bin
        })
        .sum();
    let meta_p_value = igamc(DEGREES_OF_FREEDOM / 2.0, chi_square / 2.0)?;
    let reliable = n >= MIN_RECOMMENDED_SAMPLES;
    if !reliable {
        log::warn!(
            "uniformity check on {n} p-values; at least {MIN_RECOMMENDED_SAMPLES} are recommended"
        );
    }

    Ok(UniformityReport {
        bin_counts,
        expected,
        expected_per_bin,
        chi_square,
        meta_p_value,
        passed: meta_p_value > UNIFORMITY_THRESHOLD,
        sample_size: n,
        reliable,
    })
}

/// Check that the fraction of p-values `>= alpha` lies in the NIST acceptance interval.
pub fn evaluate_proportion(p_values: &[f64], alpha: f64) -> Result<ProportionReport> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AuditError::invalid_config("alpha", alpha, "a value in (0, 1)"));
    }
    validate_p_values(p_values, "proportion")?;

    let total = p_values.len();
    let passing = p_values.iter().filter(|&&p| p >= alpha).count();
    let proportion = passing as f64 / total as f64;
    let p_hat = 1.0 - alpha;
    let half_width = 3.0 * (alpha * (1.0 - alpha) / total as f64).sqrt();
    let interval = (p_hat - half_width, p_hat + half_width);

    Ok(ProportionReport {
        alpha,
        passing,
        total,
        proportion,
        interval,
        passed: interval.0 <= proportion && proportion <= interval.1,
    })
}

/// Run both second-order checks on the p-values of one test.
pub fn assess_test(
    key: &str,
    p_values: &[f64],
    expected: ExpectedCount,
    alpha: f64,
) -> Result<TestAssessment> {
    let proportion = evaluate_proportion(p_values, alpha)?;
    let uniformity = evaluate_uniformity(p_values, expected)?;
    Ok(TestAssessment {
        key: key.to_string(),
        passed: proportion.passed && uniformity.passed,
        uniformity,
        proportion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// `per_bin` values in the middle of every bin.
    fn perfectly_uniform(per_bin: usize) -> Vec<f64> {
        (0..BINS)
            .flat_map(|b| std::iter::repeat_n(b as f64 / 10.0 + 0.05, per_bin))
            .collect()
    }

    fn seeded_uniform(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.random::<f64>()).collect()
    }

    #[test]
    fn test_igamc_reference_values() {
        let cases = [
            (4.5, 4.5, 0.437274188913867),
            (4.5, 1.0, 0.991467606628814),
            (4.5, 8.0, 0.0668815877741267),
            (4.5, 0.5, 0.999437502697832),
            (1.0, 1.0, 0.367879441171442),
        ];
        for (a, x, expected) in cases {
            let q = igamc(a, x).unwrap();
            assert!(
                (q - expected).abs() < 1e-7,
                "Q({a}, {x}) = {q}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_igamc_limits() {
        assert_eq!(igamc(4.5, 0.0).unwrap(), 1.0);
        assert_eq!(igamc(4.5, f64::INFINITY).unwrap(), 0.0);
        assert!(igamc(4.5, 500.0).unwrap() <= 1e-9);
        assert!(igamc(0.0, 1.0).is_err());
    }

    #[test]
    fn test_chi_square_critical_value() {
        // 16.919 is the 5% critical value of chi-square with 9 degrees of freedom.
        let p = igamc(4.5, 16.919 / 2.0).unwrap();
        assert!((p - 0.05).abs() < 1e-5, "p = {p}");
    }

    #[test]
    fn test_bin_index_edges() {
        assert_eq!(bin_index(0.0), 0);
        assert_eq!(bin_index(0.0999), 0);
        assert_eq!(bin_index(0.1), 1);
        assert_eq!(bin_index(0.95), 9);
        assert_eq!(bin_index(1.0), 9);
    }

    #[test]
    fn test_perfectly_uniform_sample() {
        let p_values = perfectly_uniform(100);
        let report = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
        assert_eq!(report.bin_counts, [100; BINS]);
        assert_eq!(report.chi_square, 0.0);
        assert_eq!(report.meta_p_value, 1.0);
        assert!(report.passed);
        assert!(report.reliable);
    }

    #[test]
    fn test_all_mass_in_first_bin() {
        let p_values = vec![0.05; 1000];
        let report = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
        assert_eq!(report.bin_counts, [1000, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!((report.chi_square - 9000.0).abs() < 1e-9);
        assert!(report.meta_p_value < 1e-9);
        assert!(!report.passed);
    }

    #[test]
    fn test_exact_one_lands_in_last_bin() {
        let report =
            evaluate_uniformity(&[1.0, 0.0, 0.5], ExpectedCount::SelfNormalized).unwrap();
        assert_eq!(report.bin_counts[9], 1);
        assert_eq!(report.bin_counts[0], 1);
        assert_eq!(report.bin_counts[5], 1);
        assert!(!report.reliable);
    }

    #[test]
    fn test_empty_sample_is_insufficient() {
        let err = evaluate_uniformity(&[], ExpectedCount::SelfNormalized).unwrap_err();
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for bad in [-0.01, 1.0001, f64::NAN] {
            let err =
                evaluate_uniformity(&[0.2, bad, 0.3], ExpectedCount::SelfNormalized).unwrap_err();
            assert_eq!(err.kind(), "invalid_input");
            assert!(err.to_string().contains("p_values[1]"));
        }
    }

    #[test]
    fn test_fixed_budget_zero_trials_rejected() {
        let err = evaluate_uniformity(&[0.5], ExpectedCount::FixedBudget { trials: 0 }).unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
    }

    #[test]
    fn test_fixed_budget_differs_from_self_normalized() {
        // 500 uniform p-values judged against a declared population of 1000.
        let p_values = perfectly_uniform(50);
        let own = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
        let budget =
            evaluate_uniformity(&p_values, ExpectedCount::FixedBudget { trials: 1000 }).unwrap();
        assert_eq!(own.chi_square, 0.0);
        assert_eq!(budget.expected_per_bin, 100.0);
        // Each bin: (50 - 100)^2 / 100 = 25.
        assert!((budget.chi_square - 250.0).abs() < 1e-9);
        assert!(!budget.passed);
    }

    #[test]
    fn test_permutation_invariance() {
        let mut p_values = seeded_uniform(997, 7);
        let forward = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
        p_values.reverse();
        p_values.rotate_left(311);
        let shuffled = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
        assert_eq!(forward.bin_counts, shuffled.bin_counts);
        assert_eq!(forward.chi_square, shuffled.chi_square);
        assert_eq!(forward.meta_p_value, shuffled.meta_p_value);
    }

    #[test]
    fn test_seeded_uniform_samples_pass() {
        let passes = (0..20u64)
            .filter(|&seed| {
                let p_values = seeded_uniform(10_000, seed);
                evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized)
                    .unwrap()
                    .passed
            })
            .count();
        assert_eq!(passes, 20);
    }

    #[test]
    fn test_proportion_interval() {
        let mut p_values = vec![0.5; 990];
        p_values.extend(std::iter::repeat_n(0.005, 10));
        let report = evaluate_proportion(&p_values, DEFAULT_ALPHA).unwrap();
        let half = 3.0 * (0.01f64 * 0.99 / 1000.0).sqrt();
        assert!((report.interval.0 - (0.99 - half)).abs() < 1e-12);
        assert!((report.interval.1 - (0.99 + half)).abs() < 1e-12);
        assert_eq!(report.total, 1000);
        assert_eq!(report.passing, 990);
        assert!(report.passed, "proportion {}", report.proportion);
    }

    #[test]
    fn test_proportion_fails_when_many_small_p_values() {
        let mut p_values = vec![0.5; 90];
        p_values.extend(std::iter::repeat_n(0.001, 10));
        let report = evaluate_proportion(&p_values, DEFAULT_ALPHA).unwrap();
        assert_eq!(report.passing, 90);
        assert!(!report.passed);
    }

    #[test]
    fn test_proportion_rejects_bad_alpha() {
        for alpha in [0.0, 1.0, -0.5, f64::NAN] {
            let err = evaluate_proportion(&[0.5], alpha).unwrap_err();
            assert_eq!(err.kind(), "invalid_configuration");
        }
    }

    #[test]
    fn test_assess_test_combines_checks() {
        let p_values = perfectly_uniform(100);
        let assessment =
            assess_test("Frequency_Test", &p_values, ExpectedCount::SelfNormalized, 0.01).unwrap();
        assert_eq!(assessment.key, "Frequency_Test");
        assert!(assessment.uniformity.passed);
        // A 100% pass rate sits above the interval's upper bound for m = 1000.
        assert_eq!(assessment.proportion.passing, 1000);
        assert!(!assessment.proportion.passed);
        assert!(!assessment.passed);
    }

    #[test]
    fn test_report_serializes_mode() {
        let report =
            evaluate_uniformity(&perfectly_uniform(6), ExpectedCount::FixedBudget { trials: 60 })
                .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["expected"]["mode"], "fixed_budget");
        assert_eq!(json["expected"]["trials"], 60);
        assert_eq!(json["bin_counts"].as_array().unwrap().len(), BINS);
    }
}
