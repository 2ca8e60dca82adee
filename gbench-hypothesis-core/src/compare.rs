//! Pairing of old and new metrics into per-benchmark verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::metric::Metric;
use crate::sample::Sample;
use crate::stats::{
    Alternative, FailureReason, MannWhitneyU, SignificanceTest, DEFAULT_MIN_SAMPLE_SIZE,
};

/// Errors that abort a whole comparison.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// A benchmark was recorded in different units on the two sides.
    #[error("benchmark {name} has different time units: old={old}, new={new}")]
    TimeUnitMismatch {
        name: String,
        old: String,
        new: String,
    },
}

/// Which time measurement of a benchmark is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    WallTime,
    CpuTime,
}

impl Dimension {
    /// Pick this dimension's sample out of a metric.
    pub fn sample(self, metric: &Metric) -> &Sample {
        match self {
            Dimension::WallTime => &metric.wall_time,
            Dimension::CpuTime => &metric.cpu_time,
        }
    }

    /// Short label used as a table heading.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::WallTime => "real",
            Dimension::CpuTime => "cpu",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} time", self.label())
    }
}

/// Settings for a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    /// Significance level; p-values below it count as a real change.
    pub significance_level: f64,
    /// Minimum number of repetitions per side for the rank-sum test.
    pub min_sample_size: usize,
    /// Alternative hypothesis of the rank-sum test.
    pub alternative: Alternative,
    /// Dimensions to compare, in output order.
    pub dimensions: Vec<Dimension>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            alternative: Alternative::TwoSided,
            dimensions: vec![Dimension::WallTime],
        }
    }
}

/// The comparison result for one benchmark and one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub name: String,
    pub dimension: Dimension,
    pub time_unit: String,
    /// Outlier-filtered mean of the old run.
    pub old_mean: f64,
    /// Outlier-filtered mean of the new run.
    pub new_mean: f64,
    /// Signed change of the mean in percent; `None` if not significant.
    pub percent_delta: Option<f64>,
    /// Human-readable explanation of the verdict.
    pub note: String,
    /// p-value of the rank-sum test, if it could be run.
    pub p_value: Option<f64>,
    /// Why the rank-sum test could not be run.
    pub failure: Option<FailureReason>,
    /// Raw repetition counts of the old and new run.
    pub old_count: usize,
    pub new_count: usize,
}

impl Verdict {
    /// Marker shown in place of a delta when no change was detected.
    pub const NO_CHANGE: &'static str = "~";

    /// Whether the change is statistically significant.
    pub fn is_significant(&self) -> bool {
        self.percent_delta.is_some()
    }

    /// The delta column: a signed percentage or the no-change marker.
    pub fn delta_display(&self) -> String {
        match self.percent_delta {
            None => Self::NO_CHANGE.to_string(),
            Some(delta) if delta == 0.0 => "0.00%".to_string(),
            Some(delta) => format!("{:+.2}%", delta),
        }
    }
}

/// Compares old and new metrics with the Mann-Whitney U test.
pub struct Comparator {
    config: CompareConfig,
    test: Box<dyn SignificanceTest>,
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CompareConfig::default())
    }
}

impl Comparator {
    /// Create a comparator using a rank-sum test built from `config`.
    ///
    /// # Panics
    /// Panics if `significance_level` is not in the range (0, 1) or
    /// `min_sample_size` is zero.
    pub fn new(config: CompareConfig) -> Self {
        let test = MannWhitneyU::new(config.alternative, config.min_sample_size);
        Self::with_test(config, Box::new(test))
    }

    /// Create a comparator with a custom significance test.
    ///
    /// # Panics
    /// Panics if `significance_level` is not in the range (0, 1).
    pub fn with_test(config: CompareConfig, test: Box<dyn SignificanceTest>) -> Self {
        assert!(
            config.significance_level > 0.0 && config.significance_level < 1.0,
            "significance_level must be between 0 and 1 (exclusive)"
        );
        Self { config, test }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare one dimension of a pair of metrics sharing a name.
    ///
    /// The significance test runs on the raw repetitions; the reported means
    /// are outlier-filtered.
    ///
    /// # Errors
    /// Returns [`CompareError::TimeUnitMismatch`] if the two metrics were
    /// recorded in different units.
    pub fn compare_metrics(
        &self,
        old: &Metric,
        new: &Metric,
        dimension: Dimension,
    ) -> Result<Verdict, CompareError> {
        check_units(old, new)?;

        let old_sample = dimension.sample(old);
        let new_sample = dimension.sample(new);
        let old_count = old_sample.len();
        let new_count = new_sample.len();
        let old_mean = old_sample.mean();
        let new_mean = new_sample.mean();

        let outcome = self.test.test(old_sample.values(), new_sample.values());

        let (percent_delta, note, p_value, failure) = match outcome {
            Err(reason) => {
                debug!(
                    benchmark = %new.name,
                    %dimension,
                    %reason,
                    "rank-sum test not applicable"
                );
                (None, format!("({})", reason), None, Some(reason))
            }
            Ok(result) => {
                let note = format!("(p={:.2} n={}+{})", result.p_value, old_count, new_count);
                let delta = if result.p_value < self.config.significance_level {
                    Some(percent_change(old_mean, new_mean))
                } else {
                    None
                };
                (delta, note, Some(result.p_value), None)
            }
        };

        Ok(Verdict {
            name: new.name.clone(),
            dimension,
            time_unit: new.time_unit.clone(),
            old_mean,
            new_mean,
            percent_delta,
            note,
            p_value,
            failure,
            old_count,
            new_count,
        })
    }

    /// Compare every benchmark present in both runs, for each configured
    /// dimension.
    ///
    /// Verdicts are grouped by dimension and follow the order of `old`.
    /// Benchmarks present on one side only are skipped.
    ///
    /// # Errors
    /// Fails with [`CompareError::TimeUnitMismatch`] before producing any
    /// verdict if any matched pair disagrees on its time unit.
    pub fn compare(&self, old: &[Metric], new: &[Metric]) -> Result<Vec<Verdict>, CompareError> {
        let pairs = pair_metrics(old, new);
        for (o, n) in &pairs {
            check_units(o, n)?;
        }

        let mut verdicts = Vec::with_capacity(pairs.len() * self.config.dimensions.len());
        for &dimension in &self.config.dimensions {
            for (o, n) in &pairs {
                verdicts.push(self.compare_metrics(o, n, dimension)?);
            }
        }
        Ok(verdicts)
    }
}

/// Match metrics by exact name, in the order of `old`.
pub fn pair_metrics<'a>(old: &'a [Metric], new: &'a [Metric]) -> Vec<(&'a Metric, &'a Metric)> {
    old.iter()
        .filter_map(|o| match new.iter().find(|n| n.name == o.name) {
            Some(n) => Some((o, n)),
            None => {
                debug!(benchmark = %o.name, "no matching benchmark in new run, skipping");
                None
            }
        })
        .collect()
}

fn check_units(old: &Metric, new: &Metric) -> Result<(), CompareError> {
    if old.time_unit == new.time_unit {
        Ok(())
    } else {
        Err(CompareError::TimeUnitMismatch {
            name: old.name.clone(),
            old: old.time_unit.clone(),
            new: new.time_unit.clone(),
        })
    }
}

/// Percent change from `old` to `new`; NaN inputs yield NaN.
fn percent_change(old: f64, new: f64) -> f64 {
    if old == new {
        0.0
    } else {
        (new - old) / old * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, unit: &str, wall: &[f64]) -> Metric {
        let mut metric = Metric::new(name, unit);
        for &value in wall {
            metric.add_repetition(value, value * 0.9);
        }
        metric.compute_stats();
        metric
    }

    const OLD_FOO: [f64; 10] = [
        100.0, 101.0, 99.0, 100.0, 102.0, 98.0, 101.0, 100.0, 99.0, 103.0,
    ];
    const NEW_FOO: [f64; 10] = [
        150.0, 151.0, 149.0, 150.0, 152.0, 148.0, 151.0, 150.0, 149.0, 153.0,
    ];

    #[test]
    fn test_significant_slowdown() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &OLD_FOO);
        let new = metric("Foo", "ns", &NEW_FOO);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert!(verdict.is_significant());
        assert!(verdict.p_value.unwrap() < 0.05);
        let delta = verdict.percent_delta.unwrap();
        assert!((delta - 50.0).abs() < 0.5, "delta was {}", delta);
        assert!(verdict.delta_display().starts_with('+'));
        assert!(verdict.note.contains("p="));
        assert!(verdict.note.contains("n=10+10"));
        assert_eq!(verdict.old_count, 10);
        assert_eq!(verdict.new_count, 10);
    }

    #[test]
    fn test_significant_speedup_is_negative() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &NEW_FOO);
        let new = metric("Foo", "ns", &OLD_FOO);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert!(verdict.percent_delta.unwrap() < 0.0);
        assert!(verdict.delta_display().starts_with('-'));
    }

    #[test]
    fn test_no_significant_change() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &OLD_FOO);
        let shuffled = [
            101.0, 99.0, 103.0, 100.0, 98.0, 100.0, 102.0, 99.0, 101.0, 100.0,
        ];
        let new = metric("Foo", "ns", &shuffled);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert!(!verdict.is_significant());
        assert_eq!(verdict.delta_display(), Verdict::NO_CHANGE);
        assert_eq!(verdict.note, "(p=1.00 n=10+10)");
        assert!(verdict.failure.is_none());
    }

    #[test]
    fn test_too_few_samples_noted() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &[1.0, 2.0, 3.0]);
        let new = metric("Foo", "ns", &[4.0, 5.0, 6.0]);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert_eq!(verdict.delta_display(), "~");
        assert_eq!(verdict.note, "(too few samples)");
        assert_eq!(verdict.failure, Some(FailureReason::SampleTooSmall));
        assert!(verdict.p_value.is_none());
    }

    #[test]
    fn test_identical_samples_noted() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &[5.0; 8]);
        let new = metric("Foo", "ns", &[5.0; 8]);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert_eq!(verdict.note, "(all equal)");
        assert_eq!(verdict.failure, Some(FailureReason::SamplesIdentical));
    }

    #[test]
    fn test_unit_mismatch_is_an_error() {
        let comparator = Comparator::default();
        let old = metric("Foo", "ns", &OLD_FOO);
        let new = metric("Foo", "us", &NEW_FOO);

        let result = comparator.compare_metrics(&old, &new, Dimension::WallTime);
        assert_eq!(
            result,
            Err(CompareError::TimeUnitMismatch {
                name: "Foo".to_string(),
                old: "ns".to_string(),
                new: "us".to_string(),
            })
        );
    }

    #[test]
    fn test_compare_skips_unmatched_names() {
        let comparator = Comparator::default();
        let old = vec![
            metric("OnlyOld", "ns", &OLD_FOO),
            metric("Foo", "ns", &OLD_FOO),
        ];
        let new = vec![
            metric("Foo", "ns", &NEW_FOO),
            metric("OnlyNew", "ns", &NEW_FOO),
        ];

        let verdicts = comparator.compare(&old, &new).unwrap();

        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].name, "Foo");
    }

    #[test]
    fn test_compare_is_atomic_on_unit_mismatch() {
        let comparator = Comparator::default();
        let old = vec![metric("A", "ns", &OLD_FOO), metric("B", "ns", &OLD_FOO)];
        let new = vec![metric("A", "ns", &NEW_FOO), metric("B", "ms", &NEW_FOO)];

        let result = comparator.compare(&old, &new);
        assert!(matches!(
            result,
            Err(CompareError::TimeUnitMismatch { ref name, .. }) if name == "B"
        ));
    }

    #[test]
    fn test_compare_all_dimensions() {
        let comparator = Comparator::new(CompareConfig {
            dimensions: vec![Dimension::WallTime, Dimension::CpuTime],
            ..CompareConfig::default()
        });
        let old = vec![metric("A", "ns", &OLD_FOO), metric("B", "ns", &OLD_FOO)];
        let new = vec![metric("A", "ns", &NEW_FOO), metric("B", "ns", &OLD_FOO)];

        let verdicts = comparator.compare(&old, &new).unwrap();
        let order: Vec<(&str, Dimension)> = verdicts
            .iter()
            .map(|v| (v.name.as_str(), v.dimension))
            .collect();

        assert_eq!(
            order,
            vec![
                ("A", Dimension::WallTime),
                ("B", Dimension::WallTime),
                ("A", Dimension::CpuTime),
                ("B", Dimension::CpuTime),
            ]
        );
        assert!(verdicts[2].is_significant());
        assert!((verdicts[2].old_mean - 90.27).abs() < 0.01);
    }

    #[test]
    fn test_stricter_significance_level() {
        let comparator = Comparator::new(CompareConfig {
            significance_level: 1e-6,
            ..CompareConfig::default()
        });
        let old = metric("Foo", "ns", &OLD_FOO);
        let new = metric("Foo", "ns", &NEW_FOO);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert!(!verdict.is_significant());
        assert!(verdict.note.starts_with("(p="));
    }

    #[test]
    fn test_nan_means_flow_through() {
        let comparator = Comparator::new(CompareConfig {
            min_sample_size: 1,
            ..CompareConfig::default()
        });
        let old = metric("Foo", "ns", &[f64::NAN; 10]);
        let new = metric("Foo", "ns", &NEW_FOO);

        let verdict = comparator
            .compare_metrics(&old, &new, Dimension::WallTime)
            .unwrap();

        assert_eq!(verdict.failure, Some(FailureReason::ZeroVariance));
        assert_eq!(verdict.note, "(zero variance)");
        assert_eq!(verdict.delta_display(), "~");
        assert!(verdict.percent_delta.is_none());
        assert!(verdict.p_value.is_none());
        assert!(verdict.old_mean.is_nan());
        assert!((verdict.new_mean - 150.3).abs() < 1e-9);
    }

    #[test]
    fn test_single_nan_repetition_does_not_block_comparison() {
        let mut old_values = OLD_FOO.to_vec();
        old_values.push(f64::NAN);
        let comparator = Comparator::default();

        let verdicts = comparator
            .compare(
                &[metric("Foo", "ns", &old_values)],
                &[metric("Foo", "ns", &NEW_FOO)],
            )
            .unwrap();

        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].failure, Some(FailureReason::ZeroVariance));
        assert_eq!(verdicts[0].old_count, 11);
    }

    #[test]
    fn test_delta_display() {
        let mut verdict = Comparator::default()
            .compare_metrics(
                &metric("Foo", "ns", &OLD_FOO),
                &metric("Foo", "ns", &NEW_FOO),
                Dimension::WallTime,
            )
            .unwrap();

        verdict.percent_delta = Some(0.0);
        assert_eq!(verdict.delta_display(), "0.00%");
        verdict.percent_delta = Some(-12.346);
        assert_eq!(verdict.delta_display(), "-12.35%");
        verdict.percent_delta = Some(7.0);
        assert_eq!(verdict.delta_display(), "+7.00%");
    }

    #[test]
    fn test_percent_change_equal_means() {
        assert_eq!(percent_change(10.0, 10.0), 0.0);
        assert_eq!(percent_change(10.0, 15.0), 50.0);
        assert!(percent_change(f64::NAN, 1.0).is_nan());
    }

    #[test]
    #[should_panic(expected = "significance_level must be between 0 and 1")]
    fn test_invalid_significance_level() {
        Comparator::new(CompareConfig {
            significance_level: 1.5,
            ..CompareConfig::default()
        });
    }
}
