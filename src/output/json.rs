//! JSON Lines output format

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use termcolor::WriteColor;

use crate::config::SkippedEntry;
use crate::diff::{ComparisonOutcome, SchemaChange};
use crate::model::CellValue;
use crate::runner::{BatchSummary, JobReport};

use super::OutputFormatter;

/// JSON output formatter: one compact document per line
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonJob<'a> {
    name: &'a str,
    before_file: String,
    after_file: String,
    status: &'static str,
    compared_at: String,
    key_columns: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_rows: Option<usize>,
    warnings: &'a [SchemaChange],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    differences: Vec<JsonDifference<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JsonDifference<'a> {
    key: IndexMap<&'a str, &'a str>,
    field: &'a str,
    before: &'a CellValue,
    after: &'a CellValue,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    skipped: &'a str,
    index: usize,
    reason: &'a str,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    summary: &'a BatchSummary,
}

fn write_line<T: Serialize>(writer: &mut dyn WriteColor, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

impl OutputFormatter for JsonOutput {
    fn render_job(&self, report: &JobReport<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        let mut doc = JsonJob {
            name: &report.job.name,
            before_file: report.job.before_path.display().to_string(),
            after_file: report.job.after_path.display().to_string(),
            status: "error",
            compared_at: chrono::Utc::now().to_rfc3339(),
            key_columns: report.key_columns,
            row_count: None,
            before_rows: None,
            after_rows: None,
            warnings: &[],
            differences: Vec::new(),
            error: None,
        };

        match report.result {
            Ok(outcome) => {
                doc.status = outcome.status();
                doc.warnings = outcome.warnings();
                match outcome {
                    ComparisonOutcome::RowCountMismatch { before, after } => {
                        doc.before_rows = Some(before.rows);
                        doc.after_rows = Some(after.rows);
                    }
                    ComparisonOutcome::Identical { row_count, .. }
                    | ComparisonOutcome::Differences { row_count, .. } => {
                        doc.row_count = Some(*row_count);
                    }
                }
                doc.differences = outcome
                    .differences()
                    .iter()
                    .map(|d| JsonDifference {
                        key: report
                            .key_columns
                            .iter()
                            .map(String::as_str)
                            .zip(d.key.values().iter().map(String::as_str))
                            .collect(),
                        field: &d.field,
                        before: &d.before,
                        after: &d.after,
                    })
                    .collect();
            }
            Err(e) => doc.error = Some(e.to_string()),
        }

        write_line(writer, &doc)
    }

    fn render_skipped(&self, entry: &SkippedEntry, writer: &mut dyn WriteColor) -> Result<()> {
        write_line(
            writer,
            &JsonSkipped {
                skipped: &entry.entry,
                index: entry.index,
                reason: &entry.reason,
            },
        )
    }

    fn render_summary(&self, summary: &BatchSummary, writer: &mut dyn WriteColor) -> Result<()> {
        write_line(writer, &JsonSummary { summary })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use termcolor::NoColor;

    use super::*;
    use crate::config::Job;
    use crate::diff::Difference;
    use crate::model::KeyTuple;

    #[test]
    fn test_difference_document() {
        let job = Job::new("members", "before.txt", "after.txt");
        let key_columns = vec!["ID".to_string(), "MBR_NO".to_string()];
        let result = Ok(ComparisonOutcome::Differences {
            row_count: 1,
            differences: vec![Difference {
                key: KeyTuple::from_iter(["7", "1"]),
                field: "EMAIL".into(),
                before: "".into(),
                after: CellValue::Absent,
            }],
            warnings: vec![],
        });
        let report = JobReport {
            job: &job,
            key_columns: &key_columns,
            result: &result,
        };

        let mut writer = NoColor::new(Vec::new());
        JsonOutput::new().render_job(&report, &mut writer).unwrap();
        let doc: Value = serde_json::from_slice(&writer.into_inner()).unwrap();

        assert_eq!(doc["status"], "differences");
        assert_eq!(doc["row_count"], 1);
        assert_eq!(
            doc["differences"],
            json!([{"key": {"ID": "7", "MBR_NO": "1"}, "field": "EMAIL", "before": "", "after": null}])
        );
        assert!(doc.get("error").is_none());
    }
}
