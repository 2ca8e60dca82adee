use serde::Serialize;
use thiserror::Error;

/// Identifies which side of a comparison (baseline or candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Baseline,
    Candidate,
}

/// Why a significance test could not produce a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// The pooled ranks have no variance after tie correction.
    #[error("zero variance")]
    ZeroVariance,
    /// At least one side has too few observations.
    #[error("too few samples")]
    SampleTooSmall,
    /// Every observation on both sides is the same value.
    #[error("all equal")]
    SamplesIdentical,
    /// The samples have different lengths (paired tests only).
    #[error("mismatched sample lengths")]
    MismatchedLength,
}

/// The outcome of a significance test that could be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    /// The raw test statistic (`U` for the rank-sum test).
    pub statistic: f64,
    /// The continuity-corrected standard score of the statistic.
    pub z: f64,
    /// The p-value under the configured alternative, in `[0, 1]`.
    pub p_value: f64,
}

/// Trait for statistical tests that compare two sets of measurements.
pub trait SignificanceTest: Send + Sync {
    /// Test `baseline` against `candidate`, or classify why that is not possible.
    fn test(&self, baseline: &[f64], candidate: &[f64]) -> Result<TestResult, FailureReason>;
}

mod mann_whitney;
mod summary;

pub use mann_whitney::{rank_sum_test, Alternative, MannWhitneyU, DEFAULT_MIN_SAMPLE_SIZE};
pub use summary::{bounds, mean, percentile};
