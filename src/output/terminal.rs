//! Plain-text report with optional colour

use std::path::Path;

use anyhow::Result;
use tabled::settings::Style;
use tabled::Tabled;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::SkippedEntry;
use crate::diff::{ComparisonOutcome, Difference};
use crate::runner::{BatchSummary, JobReport};

use super::OutputFormatter;

const BEFORE_START: &str = "**>>BEFORE:";
const AFTER_START: &str = "**>>AFTER:";
const HIGHLIGHT_END: &str = "<<**";

/// Text output, one block per job
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn status_line(&self, writer: &mut dyn WriteColor, color: Color, text: &str) -> Result<()> {
        writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(writer, "{}", text)?;
        writer.reset()?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_outcome(&self, report: &JobReport<'_>, outcome: &ComparisonOutcome, writer: &mut dyn WriteColor) -> Result<()> {
        match outcome {
            ComparisonOutcome::RowCountMismatch { before, after } => {
                self.status_line(writer, Color::Red, "TEST FAILED: Row Count Mismatch!")?;
                writeln!(
                    writer,
                    "The number of rows are mismatch in file {} ({} rows) and {} ({} rows)",
                    file_name(&before.path),
                    before.rows,
                    file_name(&after.path),
                    after.rows
                )?;
            }
            ComparisonOutcome::Identical { row_count, warnings }
            | ComparisonOutcome::Differences {
                row_count, warnings, ..
            } => {
                self.status_line(
                    writer,
                    Color::Green,
                    &format!(
                        "Row Count Check Passed: Both files have {} data rows. Proceeding to cell-level comparison.",
                        row_count
                    ),
                )?;
                for warning in warnings {
                    writeln!(writer, "Warning: column {}", warning)?;
                }

                let differences = outcome.differences();
                if differences.is_empty() {
                    self.status_line(
                        writer,
                        Color::Green,
                        "Cell-Level Comparison Passed: No differences found in data fields.",
                    )?;
                } else {
                    self.status_line(writer, Color::Yellow, "Cell-Level Differences Found:")?;
                    writeln!(
                        writer,
                        "Format: KEY_COLUMNS\tFIELD_NAME: {}Value_B{} | {}Value_A{}",
                        BEFORE_START, HIGHLIGHT_END, AFTER_START, HIGHLIGHT_END
                    )?;
                    writeln!(writer, "{}", "-".repeat(100))?;
                    for line in difference_lines(report.key_columns, differences) {
                        writeln!(writer, "{}", line)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render_job(&self, report: &JobReport<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(writer)?;
        writeln!(writer, "--- Running Test: {} ---", report.job.name)?;
        match report.result {
            Ok(outcome) => self.write_outcome(report, outcome, writer)?,
            Err(e) => self.status_line(writer, Color::Red, &format!("Error: {}", e))?,
        }
        Ok(())
    }

    fn render_skipped(&self, entry: &SkippedEntry, writer: &mut dyn WriteColor) -> Result<()> {
        self.status_line(
            writer,
            Color::Yellow,
            &format!("Warning: Skipping malformed test case entry: {} ({})", entry.entry, entry.reason),
        )
    }

    fn render_summary(&self, summary: &BatchSummary, writer: &mut dyn WriteColor) -> Result<()> {
        if summary.jobs.len() < 2 {
            return Ok(());
        }

        #[derive(Tabled)]
        struct SummaryRow<'a> {
            #[tabled(rename = "Job")]
            name: &'a str,
            #[tabled(rename = "Status")]
            status: String,
            #[tabled(rename = "Rows")]
            rows: String,
            #[tabled(rename = "Differing fields")]
            differing_fields: usize,
        }

        let rows = summary.jobs.iter().map(|j| SummaryRow {
            name: &j.name,
            status: j.status.to_string(),
            rows: j.rows.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            differing_fields: j.differing_fields,
        });

        writeln!(writer)?;
        writeln!(writer, "{}", tabled::Table::new(rows).with(Style::rounded()))?;
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One tab-separated line per differing row.
///
/// `differences` must be grouped by key, as the differ produces them.
fn difference_lines(key_columns: &[String], differences: &[Difference]) -> Vec<String> {
    differences
        .chunk_by(|a, b| a.key == b.key)
        .map(|group| {
            let key = &group[0].key;
            let mut parts: Vec<String> = key_columns
                .iter()
                .zip(key.values())
                .map(|(k, v)| format!("KEY:{}={}", k, v))
                .collect();
            parts.extend(group.iter().map(field_part));
            parts.join("\t")
        })
        .collect()
}

fn field_part(d: &Difference) -> String {
    let mut out = format!("{}:", d.field);
    if let Some(before) = d.before.as_str() {
        out.push_str(&format!("{}{}{}", BEFORE_START, before, HIGHLIGHT_END));
    }
    if let Some(after) = d.after.as_str() {
        if !d.before.is_absent() {
            out.push_str(" | ");
        }
        out.push_str(&format!("{}{}{}", AFTER_START, after, HIGHLIGHT_END));
    }
    out
}
