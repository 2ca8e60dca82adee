use std::io::{self, Write};

use colored::Colorize;

use super::{ReportError, Reporter};
use crate::compare::{Dimension, Verdict};

/// Number of spaces between table columns.
const COLUMN_GAP: usize = 2;

/// A reporter that prints one aligned table per compared dimension.
#[derive(Debug, Clone)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

/// Direction of a verdict, used for coloring and the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Faster,
    Slower,
    Unchanged,
}

impl Change {
    fn of(verdict: &Verdict) -> Self {
        match verdict.percent_delta {
            Some(delta) if delta < 0.0 => Change::Faster,
            Some(delta) if delta > 0.0 => Change::Slower,
            _ => Change::Unchanged,
        }
    }
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    /// Format a mean with its unit; NaN stays visible as `NaN`.
    fn format_time(mean: f64, unit: &str) -> String {
        format!("{:.2}{}", mean, unit)
    }

    /// The plain-text cells of one table row.
    fn cells(verdict: &Verdict) -> [String; 5] {
        [
            verdict.name.clone(),
            verdict.delta_display(),
            verdict.note.clone(),
            Self::format_time(verdict.old_mean, &verdict.time_unit),
            Self::format_time(verdict.new_mean, &verdict.time_unit),
        ]
    }

    /// Color an already padded delta cell.
    fn color_delta(&self, padded: String, change: Change) -> String {
        if !self.use_colors {
            return padded;
        }
        match change {
            Change::Faster => padded.green().to_string(),
            Change::Slower => padded.red().to_string(),
            Change::Unchanged => padded.yellow().to_string(),
        }
    }

    /// Write every row with columns padded to the widest cell.
    fn print_table(
        &self,
        writer: &mut impl Write,
        dimension: Dimension,
        verdicts: &[&Verdict],
    ) -> io::Result<()> {
        let label = dimension.to_string();
        let header = [label.as_str(), "delta", "note", "old", "new"].map(str::to_string);
        let rule = header.clone().map(|h| "-".repeat(h.len()));
        let rows: Vec<[String; 5]> = verdicts.iter().map(|v| Self::cells(v)).collect();

        let mut widths = [0usize; 5];
        for row in std::iter::once(&header).chain(&rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let pad = |cell: &str, column: usize| {
            format!("{:<width$}", cell, width = widths[column] + COLUMN_GAP)
        };
        let join = |row: &[String; 5]| -> String {
            let line: String = row.iter().enumerate().map(|(i, c)| pad(c, i)).collect();
            line.trim_end().to_string()
        };

        let header_line = join(&header);
        if self.use_colors {
            writeln!(writer, "{}", header_line.bold())?;
        } else {
            writeln!(writer, "{}", header_line)?;
        }
        writeln!(writer, "{}", join(&rule))?;

        for (verdict, row) in verdicts.iter().zip(&rows) {
            let delta = self.color_delta(pad(&row[1], 1), Change::of(verdict));
            let line = format!(
                "{}{}{}{}{}",
                pad(&row[0], 0),
                delta,
                pad(&row[2], 2),
                pad(&row[3], 3),
                row[4]
            );
            writeln!(writer, "{}", line.trim_end())?;
        }
        Ok(())
    }

    /// Print the count of faster, slower and unchanged benchmarks.
    fn print_summary(&self, writer: &mut impl Write, verdicts: &[&Verdict]) -> io::Result<()> {
        let count = |change: Change| {
            verdicts
                .iter()
                .filter(|v| Change::of(v) == change)
                .count()
        };
        let faster_text = format!("{} faster", count(Change::Faster));
        let slower_text = format!("{} slower", count(Change::Slower));
        let unchanged_text = format!("{} unchanged", count(Change::Unchanged));

        writeln!(writer)?;
        if self.use_colors {
            writeln!(
                writer,
                "{} {}, {}, {}",
                "Summary:".bold(),
                faster_text.green(),
                slower_text.red(),
                unchanged_text.yellow()
            )
        } else {
            writeln!(
                writer,
                "Summary: {}, {}, {}",
                faster_text, slower_text, unchanged_text
            )
        }
    }

    /// Write the report for `verdicts` to `writer`, one section per dimension
    /// in order of first appearance.
    pub fn write_to(&self, writer: &mut impl Write, verdicts: &[Verdict]) -> io::Result<()> {
        let mut dimensions: Vec<Dimension> = Vec::new();
        for verdict in verdicts {
            if !dimensions.contains(&verdict.dimension) {
                dimensions.push(verdict.dimension);
            }
        }

        for (i, &dimension) in dimensions.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            let section: Vec<&Verdict> = verdicts
                .iter()
                .filter(|v| v.dimension == dimension)
                .collect();
            self.print_table(writer, dimension, &section)?;
            self.print_summary(writer, &section)?;
        }
        Ok(())
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, verdicts: &[Verdict]) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_to(&mut writer, verdicts)?;
        Ok(())
    }
}
