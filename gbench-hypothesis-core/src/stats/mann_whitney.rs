use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use super::{FailureReason, Side, SignificanceTest, TestResult};

/// Smallest per-side sample size for which the normal approximation is used.
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 8;

/// Alternative hypothesis for the rank-sum test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// The two distributions differ in location.
    #[default]
    TwoSided,
    /// The first sample is stochastically greater than the second.
    Greater,
    /// The first sample is stochastically less than the second.
    Less,
}

/// Mann-Whitney U test (Wilcoxon rank-sum test) for two independent samples.
///
/// Ties receive the average of the ranks they span, and the null variance is
/// tie-corrected. The p-value comes from the continuity-corrected normal
/// approximation, so samples smaller than `min_sample_size` are rejected.
#[derive(Debug, Clone)]
pub struct MannWhitneyU {
    /// Which alternative hypothesis the p-value refers to.
    pub alternative: Alternative,
    /// Minimum number of observations required on each side.
    pub min_sample_size: usize,
}

impl Default for MannWhitneyU {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
        }
    }
}

impl MannWhitneyU {
    /// Create a new rank-sum test.
    ///
    /// # Panics
    /// Panics if `min_sample_size` is zero.
    pub fn new(alternative: Alternative, min_sample_size: usize) -> Self {
        assert!(min_sample_size > 0, "min_sample_size must be at least 1");
        Self {
            alternative,
            min_sample_size,
        }
    }
}

impl SignificanceTest for MannWhitneyU {
    fn test(&self, a: &[f64], b: &[f64]) -> Result<TestResult, FailureReason> {
        rank_sum_test(a, b, self.alternative, self.min_sample_size)
    }
}

/// Run the Mann-Whitney U test on `a` against `b`.
///
/// The returned statistic is `U` for `a`: the number of (a, b) pairs in which
/// the `a` observation is larger, counting ties as one half.
///
/// # Errors
/// * [`FailureReason::SampleTooSmall`] if either side has fewer than
///   `min_sample_size` observations (or none at all).
/// * [`FailureReason::SamplesIdentical`] if every observation is the same value.
/// * [`FailureReason::ZeroVariance`] if the tie-corrected variance of `U` is
///   not positive, or if any observation is NaN.
pub fn rank_sum_test(
    a: &[f64],
    b: &[f64],
    alternative: Alternative,
    min_sample_size: usize,
) -> Result<TestResult, FailureReason> {
    let min_sample_size = min_sample_size.max(1);
    if a.len() < min_sample_size || b.len() < min_sample_size {
        return Err(FailureReason::SampleTooSmall);
    }

    let first = a[0];
    if a.iter().chain(b).all(|&x| x == first) {
        return Err(FailureReason::SamplesIdentical);
    }
    // A NaN observation has no rank.
    if a.iter().chain(b).any(|x| x.is_nan()) {
        return Err(FailureReason::ZeroVariance);
    }

    let ranks = RankSums::compute(a, b);

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    let u = ranks.baseline - n_a * (n_a + 1.0) / 2.0;
    let mu = n_a * n_b / 2.0;
    let variance = tie_corrected_variance(a.len(), b.len(), ranks.tie_term);

    if variance <= 0.0 {
        return Err(FailureReason::ZeroVariance);
    }
    let sigma = variance.sqrt();

    let (z, p_value) = match alternative {
        Alternative::TwoSided => {
            let shift = u - mu;
            let magnitude = (shift.abs() - 0.5).max(0.0) / sigma;
            let p = (2.0 * normal_sf(magnitude)).min(1.0);
            (magnitude.copysign(shift), p)
        }
        Alternative::Greater => {
            let z = (u - mu - 0.5) / sigma;
            (z, normal_sf(z))
        }
        Alternative::Less => {
            let z = (u - mu + 0.5) / sigma;
            (z, normal_cdf(z))
        }
    };

    Ok(TestResult {
        statistic: u,
        z,
        p_value,
    })
}

/// Variance of `U` under the null hypothesis, reduced by the tie term
/// `sum(t^3 - t)` over all tie groups.
fn tie_corrected_variance(n_a: usize, n_b: usize, tie_term: f64) -> f64 {
    let n_a = n_a as f64;
    let n_b = n_b as f64;
    let n = n_a + n_b;
    if n < 2.0 {
        return 0.0;
    }
    n_a * n_b / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))
}

/// Rank sum of the first sample in the pooled ordering, plus the tie term.
#[derive(Debug)]
struct RankSums {
    baseline: f64,
    tie_term: f64,
}

impl RankSums {
    fn compute(a: &[f64], b: &[f64]) -> Self {
        let mut pooled: Vec<(f64, Side)> = a
            .iter()
            .map(|&x| (x, Side::Baseline))
            .chain(b.iter().map(|&x| (x, Side::Candidate)))
            .collect();
        pooled.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut baseline = 0.0;
        let mut tie_term = 0.0;
        let mut start = 0;
        while start < pooled.len() {
            let value = pooled[start].0;
            let end = pooled[start..]
                .iter()
                .position(|(x, _)| x.total_cmp(&value) != Ordering::Equal)
                .map_or(pooled.len(), |offset| start + offset);

            // Positions start..end hold ranks start+1..=end.
            let rank = (start + 1 + end) as f64 / 2.0;
            let run = &pooled[start..end];
            let from_baseline = run
                .iter()
                .filter(|(_, side)| *side == Side::Baseline)
                .count();
            baseline += rank * from_baseline as f64;

            let t = run.len() as f64;
            tie_term += t * t * t - t;

            start = end;
        }

        Self { baseline, tie_term }
    }
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}
