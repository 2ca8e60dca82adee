//! Configuration loading for gbench-hypothesis.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{ensure, Context, Result};
use gbench_hypothesis_core::stats::DEFAULT_MIN_SAMPLE_SIZE;
use gbench_hypothesis_core::{Alternative, CompareConfig, Dimension};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for gbench-hypothesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for statistical hypothesis testing.
    pub hypothesis: HypothesisConfig,
    /// Settings for the printed report.
    pub report: ReportConfig,
}

/// Configuration for statistical hypothesis testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// p-values below this level are reported as a change.
    pub significance_level: f64,
    /// Minimum number of repetitions per side for the rank-sum test.
    pub min_sample_size: usize,
    /// Alternative hypothesis of the rank-sum test.
    pub alternative: Alternative,
}

/// Configuration for the printed report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Compare CPU time in addition to real time.
    pub with_cpu: bool,
    /// Colorize the terminal table.
    pub colors: bool,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            alternative: Alternative::TwoSided,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            with_cpu: false,
            colors: true,
        }
    }
}

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".gbench-hypothesis.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the default file (`.gbench-hypothesis.toml`) or use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the specified file cannot be read or parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }

    /// Validate the settings and convert them into a comparison configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the significance level is outside (0, 1) or the
    /// minimum sample size is zero.
    pub fn compare_config(&self) -> Result<CompareConfig> {
        let alpha = self.hypothesis.significance_level;
        ensure!(
            alpha > 0.0 && alpha < 1.0,
            "significance_level must be between 0 and 1 (exclusive), got {}",
            alpha
        );
        ensure!(
            self.hypothesis.min_sample_size > 0,
            "min_sample_size must be at least 1"
        );

        let mut dimensions = vec![Dimension::WallTime];
        if self.report.with_cpu {
            dimensions.push(Dimension::CpuTime);
        }

        Ok(CompareConfig {
            significance_level: alpha,
            min_sample_size: self.hypothesis.min_sample_size,
            alternative: self.hypothesis.alternative,
            dimensions,
        })
    }
}
