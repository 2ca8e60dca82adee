//! Grouping of raw benchmark records into per-benchmark metrics.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::format::BenchmarkRecord;
use crate::sample::Sample;

/// Wall-time and CPU-time samples for one benchmark name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Name of the benchmark.
    pub name: String,
    /// Unit every measurement of this benchmark is expressed in.
    pub time_unit: String,
    /// Real (wall-clock) time per repetition.
    pub wall_time: Sample,
    /// CPU time per repetition.
    pub cpu_time: Sample,
}

impl Metric {
    /// Create a metric with empty samples.
    pub fn new(name: impl Into<String>, time_unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time_unit: time_unit.into(),
            wall_time: Sample::new(),
            cpu_time: Sample::new(),
        }
    }

    /// Add one repetition's measurements.
    pub fn add_repetition(&mut self, wall_time: f64, cpu_time: f64) {
        self.wall_time.push(wall_time);
        self.cpu_time.push(cpu_time);
    }

    /// Finalize both samples.
    pub fn compute_stats(&mut self) {
        self.wall_time.compute_stats();
        self.cpu_time.compute_stats();
    }
}

/// Group iteration records by benchmark name.
///
/// Aggregate rows (mean, median, stddev, ...) and records flagged with an
/// error never enter a sample, and neither do records whose name `filter`
/// rejects. Metrics are returned in order of each name's first appearance.
/// The time unit of a metric is the unit of its first record.
pub fn build_metrics<F>(records: &[BenchmarkRecord], filter: F) -> Vec<Metric>
where
    F: Fn(&str) -> bool,
{
    let mut metrics: Vec<Metric> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if !record.is_iteration() {
            continue;
        }
        if !filter(&record.name) {
            continue;
        }
        if record.error_occurred {
            warn!(
                benchmark = %record.name,
                error = record.error_message.as_deref().unwrap_or("unknown error"),
                "skipping failed benchmark repetition"
            );
            continue;
        }

        let slot = *index.entry(record.name.as_str()).or_insert_with(|| {
            metrics.push(Metric::new(&record.name, &record.time_unit));
            metrics.len() - 1
        });
        metrics[slot].add_repetition(record.real_time, record.cpu_time);
    }

    for metric in &mut metrics {
        metric.compute_stats();
        debug!(
            benchmark = %metric.name,
            repetitions = metric.wall_time.len(),
            kept = metric.wall_time.filtered_values().len(),
            "built metric"
        );
    }

    metrics
}
