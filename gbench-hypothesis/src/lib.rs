//! gbench-hypothesis: significance testing for Google Benchmark results
//!
//! This library compares two `--benchmark_out` JSON files and reports, per
//! benchmark, whether the change in timing is statistically significant.

pub mod app;
pub mod cli;
pub mod config;

// Re-export core types for convenience
pub use gbench_hypothesis_core::compare::{
    CompareConfig, CompareError, Comparator, Dimension, Verdict,
};
pub use gbench_hypothesis_core::report::{JsonReporter, ReportError, Reporter, TerminalReporter};
pub use gbench_hypothesis_core::stats::{Alternative, FailureReason};

// Re-export main types from this crate
pub use app::{load_benchmarks, run, Comparison};
pub use cli::Cli;
pub use config::Config;
