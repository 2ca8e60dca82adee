//! The comparison pipeline behind the command line.

use std::path::Path;

use anyhow::{Context, Result};
use gbench_hypothesis_core::{build_metrics, BenchmarkFile, Comparator, Verdict};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;

/// Verdicts of a completed run, together with the settings that produced them.
#[derive(Debug)]
pub struct Comparison {
    pub config: Config,
    pub verdicts: Vec<Verdict>,
}

/// Decode a Google Benchmark output file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid benchmark JSON.
pub fn load_benchmarks(path: &Path) -> Result<BenchmarkFile> {
    let file = BenchmarkFile::from_path(path)
        .with_context(|| format!("Failed to load benchmark results from {}", path.display()))?;

    debug!(
        path = %path.display(),
        host = %file.context.host_name,
        date = %file.context.date,
        num_cpus = file.context.num_cpus,
        records = file.benchmarks.len(),
        "loaded benchmark results"
    );
    Ok(file)
}

/// Load configuration, read both result files and compare them.
///
/// # Errors
///
/// Returns an error if the configuration or either input cannot be loaded,
/// or if a benchmark was recorded in different time units.
pub fn run(cli: &Cli) -> Result<Comparison> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);
    debug!(?config, "configuration");

    let comparator = Comparator::new(config.compare_config()?);

    let old = load_benchmarks(&cli.old)?;
    let new = load_benchmarks(&cli.new)?;

    let filter = cli.name_filter();
    let old_metrics = build_metrics(&old.benchmarks, &filter);
    let new_metrics = build_metrics(&new.benchmarks, &filter);
    info!(
        old = old_metrics.len(),
        new = new_metrics.len(),
        "grouped benchmarks"
    );

    let verdicts = comparator
        .compare(&old_metrics, &new_metrics)
        .context("Failed to compare benchmarks")?;

    Ok(Comparison { config, verdicts })
}
