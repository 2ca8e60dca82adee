//! Core statistics for gbench-hypothesis.
//!
//! This crate turns Google Benchmark repetitions into per-benchmark samples,
//! removes outliers, and decides with a Mann-Whitney U test whether the
//! difference between two runs is significant.

pub mod compare;
pub mod format;
pub mod metric;
pub mod report;
pub mod sample;
pub mod stats;

// Re-export main types for convenience
pub use compare::{pair_metrics, CompareConfig, CompareError, Comparator, Dimension, Verdict};
pub use format::{BenchmarkFile, BenchmarkRecord, Context, FormatError, RecordKind};
pub use metric::{build_metrics, Metric};
pub use report::{JsonReporter, ReportError, Reporter, TerminalReporter};
pub use sample::Sample;
pub use stats::{
    rank_sum_test, Alternative, FailureReason, MannWhitneyU, SignificanceTest, TestResult,
};
