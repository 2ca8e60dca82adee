//! Command-line interface for gbench-hypothesis.

use crate::config::Config;
use clap::{Parser, ValueEnum};
use gbench_hypothesis_core::Alternative;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
For each benchmark present in both files, outliers are removed with the
interquartile range rule and a Mann-Whitney U test is run on the raw
repetitions. The delta column shows the % change of the mean from OLD to NEW,
or ~ when the change is not significant; the note shows the p-value and the
sample sizes, or why the test could not be run.

Run the benchmarks with --benchmark_out=file.json and
--benchmark_repetitions=10 (or more).";

/// Alternative hypothesis, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlternativeArg {
    /// The old and new timings differ in location.
    TwoSided,
    /// The old timings are greater than the new ones.
    Greater,
    /// The old timings are less than the new ones.
    Less,
}

impl From<AlternativeArg> for Alternative {
    fn from(arg: AlternativeArg) -> Self {
        match arg {
            AlternativeArg::TwoSided => Alternative::TwoSided,
            AlternativeArg::Greater => Alternative::Greater,
            AlternativeArg::Less => Alternative::Less,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gbench-hypothesis")]
#[command(about = "Compare two Google Benchmark runs with a Mann-Whitney U test")]
#[command(version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Benchmark output (JSON) of the old run
    pub old: PathBuf,

    /// Benchmark output (JSON) of the new run
    pub new: PathBuf,

    /// Compare CPU time in addition to real time
    #[arg(long)]
    pub with_cpu: bool,

    /// Only compare benchmarks whose name contains this string
    #[arg(long)]
    pub filter: Option<String>,

    /// Significance level for the rank-sum test (0.0-1.0)
    #[arg(long)]
    pub significance_level: Option<f64>,

    /// Minimum repetitions per benchmark and side
    #[arg(long)]
    pub min_sample_size: Option<usize>,

    /// Alternative hypothesis of the rank-sum test
    #[arg(long, value_enum)]
    pub alternative: Option<AlternativeArg>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print verdicts as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Path to config file (defaults to .gbench-hypothesis.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values and set flags will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(significance_level) = self.significance_level {
            config.hypothesis.significance_level = significance_level;
        }

        if let Some(min_sample_size) = self.min_sample_size {
            config.hypothesis.min_sample_size = min_sample_size;
        }

        if let Some(alternative) = self.alternative {
            config.hypothesis.alternative = alternative.into();
        }

        if self.with_cpu {
            config.report.with_cpu = true;
        }

        if self.no_color {
            config.report.colors = false;
        }
    }

    /// Predicate selecting the benchmarks to compare.
    pub fn name_filter(&self) -> impl Fn(&str) -> bool + '_ {
        move |name: &str| match &self.filter {
            Some(pattern) => name.contains(pattern.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_config_with_overrides() {
        let cli = Cli::parse_from([
            "gbench-hypothesis",
            "old.json",
            "new.json",
            "--significance-level",
            "0.01",
            "--min-sample-size",
            "20",
            "--alternative",
            "greater",
            "--with-cpu",
            "--no-color",
        ]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.hypothesis.significance_level, 0.01);
        assert_eq!(config.hypothesis.min_sample_size, 20);
        assert_eq!(config.hypothesis.alternative, Alternative::Greater);
        assert!(config.report.with_cpu);
        assert!(!config.report.colors);
    }

    #[test]
    fn test_apply_to_config_without_overrides() {
        let cli = Cli::parse_from(["gbench-hypothesis", "old.json", "new.json"]);

        let mut config = Config::default();
        config.report.with_cpu = true;
        config.hypothesis.min_sample_size = 12;
        cli.apply_to_config(&mut config);

        // Values from the file should remain unchanged
        assert_eq!(config.hypothesis.significance_level, 0.05);
        assert_eq!(config.hypothesis.min_sample_size, 12);
        assert!(config.report.with_cpu);
        assert!(config.report.colors);
    }

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::parse_from(["gbench-hypothesis", "a.json", "b.json"]);

        assert_eq!(cli.old, PathBuf::from("a.json"));
        assert_eq!(cli.new, PathBuf::from("b.json"));
        assert!(!cli.with_cpu);
        assert!(cli.filter.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_requires_both_files() {
        let result = Cli::try_parse_from(["gbench-hypothesis", "a.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_alternative() {
        let result = Cli::try_parse_from([
            "gbench-hypothesis",
            "a.json",
            "b.json",
            "--alternative",
            "sideways",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_name_filter() {
        let cli = Cli::parse_from([
            "gbench-hypothesis",
            "a.json",
            "b.json",
            "--filter",
            "BM_foo",
        ]);
        let filter = cli.name_filter();

        assert!(filter("BM_foo/8"));
        assert!(!filter("BM_bar/8"));

        let cli = Cli::parse_from(["gbench-hypothesis", "a.json", "b.json"]);
        assert!((cli.name_filter())("anything"));
    }

    #[test]
    fn test_cli_parse_verbose_json() {
        let cli = Cli::parse_from([
            "gbench-hypothesis",
            "-v",
            "--json",
            "--config",
            "custom.toml",
            "a.json",
            "b.json",
        ]);

        assert!(cli.verbose);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
