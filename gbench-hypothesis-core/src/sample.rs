//! Repeated measurements of one benchmark metric.

use serde::Serialize;

use crate::stats::{bounds, mean, percentile};

/// Multiplier applied to the interquartile range to place Tukey's fences.
const TUKEY_FENCE: f64 = 1.5;

/// One group of repeated measurements for one benchmark and one metric.
///
/// Values are pushed as they are read, then [`Sample::compute_stats`]
/// sorts them, drops outliers and derives the summary. The summary of an
/// empty (or fully filtered) sample is NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<f64>,
    filtered_values: Vec<f64>,
    min: f64,
    mean: f64,
    max: f64,
}

impl Default for Sample {
    fn default() -> Self {
        Self::new()
    }
}

impl Sample {
    /// Create an empty sample.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            filtered_values: Vec::new(),
            min: f64::NAN,
            mean: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Build and finalize a sample from raw measurements.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sample = Self {
            values: values.into_iter().collect(),
            ..Self::new()
        };
        sample.compute_stats();
        sample
    }

    /// Add a raw measurement.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Sort the raw values, remove outliers with Tukey's fences and derive
    /// min, mean and max from what remains.
    ///
    /// Recomputes from scratch, so calling it again after more pushes is safe.
    pub fn compute_stats(&mut self) {
        self.values.sort_by(f64::total_cmp);

        let q1 = percentile(&self.values, 0.25);
        let q3 = percentile(&self.values, 0.75);
        let iqr = q3 - q1;
        let lo = q1 - TUKEY_FENCE * iqr;
        let hi = q3 + TUKEY_FENCE * iqr;

        self.filtered_values = self
            .values
            .iter()
            .copied()
            .filter(|value| (lo..=hi).contains(value))
            .collect();

        (self.min, self.max) = bounds(&self.filtered_values);
        self.mean = mean(&self.filtered_values);
    }

    /// All raw measurements, sorted ascending once finalized.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Raw measurements with outliers removed.
    pub fn filtered_values(&self) -> &[f64] {
        &self.filtered_values
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of raw measurements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
