use std::io::{self, Write};

use serde::Serialize;

use super::{ReportError, Reporter};
use crate::compare::Verdict;

/// A reporter that prints the verdicts as a pretty-printed JSON array.
///
/// Each verdict carries a `delta` string as printed in the table (`~`,
/// `0.00%` or a signed percentage). NaN numbers are written as `null`, so a
/// significant change with a NaN `percent_delta` still shows `"delta": "NaN%"`.
#[derive(Debug, Clone, Default)]
pub struct JsonReporter;

#[derive(Serialize)]
struct JsonVerdict<'a> {
    #[serde(flatten)]
    verdict: &'a Verdict,
    delta: String,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    /// Write the verdicts to `writer`, followed by a newline.
    pub fn write_to(
        &self,
        writer: &mut impl Write,
        verdicts: &[Verdict],
    ) -> Result<(), ReportError> {
        let rows: Vec<JsonVerdict<'_>> = verdicts
            .iter()
            .map(|verdict| JsonVerdict {
                verdict,
                delta: verdict.delta_display(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *writer, &rows)?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn report(&self, verdicts: &[Verdict]) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_to(&mut writer, verdicts)
    }
}
