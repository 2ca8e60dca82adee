//! Google Benchmark JSON output (`--benchmark_out=file.json`).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregate name suffixes emitted by releases that predate `run_type`.
const AGGREGATE_SUFFIXES: [&str; 4] = ["_mean", "_median", "_stddev", "_cv"];

/// Errors that can occur while decoding a benchmark output file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid benchmark JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A complete benchmark output file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkFile {
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkRecord>,
}

impl BenchmarkFile {
    /// Decode a benchmark file from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, FormatError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Open and decode the benchmark file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let file = File::open(path).map_err(|source| FormatError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

/// Description of the machine a benchmark run was recorded on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub date: String,
    pub host_name: String,
    pub executable: String,
    pub num_cpus: u32,
    pub mhz_per_cpu: u32,
    pub cpu_scaling_enabled: bool,
    pub caches: Vec<Cache>,
}

/// One CPU cache level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cache {
    #[serde(rename = "type")]
    pub kind: String,
    pub level: u32,
    pub size: u64,
    pub num_sharing: u32,
}

/// Whether a record is a single repetition or a precomputed aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Iteration,
    Aggregate,
}

/// One row of the `benchmarks` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_type: Option<RecordKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_name: Option<String>,
    #[serde(default)]
    pub repetitions: u64,
    #[serde(default)]
    pub repetition_index: u64,
    #[serde(default)]
    pub threads: u32,
    #[serde(default)]
    pub iterations: u64,
    #[serde(default = "nan")]
    pub real_time: f64,
    #[serde(default = "nan")]
    pub cpu_time: f64,
    #[serde(default = "default_time_unit")]
    pub time_unit: String,
    #[serde(default)]
    pub error_occurred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn nan() -> f64 {
    f64::NAN
}

fn default_time_unit() -> String {
    "ns".to_string()
}

impl BenchmarkRecord {
    /// Create a repetition record.
    pub fn iteration(
        name: impl Into<String>,
        real_time: f64,
        cpu_time: f64,
        time_unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            run_name: None,
            run_type: Some(RecordKind::Iteration),
            aggregate_name: None,
            repetitions: 0,
            repetition_index: 0,
            threads: 1,
            iterations: 1,
            real_time,
            cpu_time,
            time_unit: time_unit.into(),
            error_occurred: false,
            error_message: None,
        }
    }

    /// Create an aggregate record such as `name_mean`.
    pub fn aggregate(
        name: impl Into<String>,
        aggregate_name: impl Into<String>,
        real_time: f64,
        cpu_time: f64,
        time_unit: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let aggregate_name = aggregate_name.into();
        Self {
            name: format!("{}_{}", name, aggregate_name),
            run_name: Some(name),
            run_type: Some(RecordKind::Aggregate),
            aggregate_name: Some(aggregate_name),
            ..Self::iteration("", real_time, cpu_time, time_unit)
        }
    }

    /// The kind of this record.
    ///
    /// Uses `run_type` when present, otherwise recognizes aggregates by their
    /// name suffix.
    pub fn kind(&self) -> RecordKind {
        match self.run_type {
            Some(kind) => kind,
            None if AGGREGATE_SUFFIXES
                .iter()
                .any(|suffix| self.name.ends_with(suffix)) =>
            {
                RecordKind::Aggregate
            }
            None => RecordKind::Iteration,
        }
    }

    /// Whether this record holds one raw repetition measurement.
    pub fn is_iteration(&self) -> bool {
        self.kind() == RecordKind::Iteration
    }
}
