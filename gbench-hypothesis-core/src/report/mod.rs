use crate::compare::Verdict;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize verdicts: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives the verdicts of a comparison run.
pub trait Reporter: Send + Sync {
    fn report(&self, verdicts: &[Verdict]) -> Result<(), ReportError>;
}

mod json;
mod terminal;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;
