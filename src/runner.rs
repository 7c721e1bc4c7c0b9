//! Batch execution of comparison jobs

use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::config::{BatchConfig, Config, Job, SkippedEntry};
use crate::diff::{compute_diff, ComparisonOutcome};
use crate::error::DiffError;
use crate::parser::Parser;

/// Everything a reporter needs to render one finished job
#[derive(Debug, Clone, Copy)]
pub struct JobReport<'a> {
    pub job: &'a Job,
    pub key_columns: &'a [String],
    pub result: &'a Result<ComparisonOutcome, DiffError>,
}

/// Receives job results as a batch runs.
///
/// Errors returned here abort the batch; comparison failures do not.
pub trait Reporter {
    fn job_started(&mut self, _job: &Job) -> Result<()> {
        Ok(())
    }

    fn job_finished(&mut self, report: &JobReport<'_>) -> Result<()>;

    fn job_skipped(&mut self, entry: &SkippedEntry) -> Result<()>;

    fn batch_finished(&mut self, _summary: &BatchSummary) -> Result<()> {
        Ok(())
    }
}

/// Final state of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Identical,
    Differences,
    RowCountMismatch,
    Failed,
    Skipped,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Identical => "identical",
            JobStatus::Differences => "differences",
            JobStatus::RowCountMismatch => "row count mismatch",
            JobStatus::Failed => "failed",
            JobStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub name: String,
    pub status: JobStatus,
    /// Data rows per side, when both sides loaded with equal counts
    pub rows: Option<usize>,
    pub differing_fields: usize,
}

impl JobSummary {
    fn from_result(name: &str, result: &Result<ComparisonOutcome, DiffError>) -> Self {
        let (status, rows, differing_fields) = match result {
            Ok(ComparisonOutcome::Identical { row_count, .. }) => (JobStatus::Identical, Some(*row_count), 0),
            Ok(ComparisonOutcome::Differences {
                row_count,
                differences,
                ..
            }) => (JobStatus::Differences, Some(*row_count), differences.len()),
            Ok(ComparisonOutcome::RowCountMismatch { .. }) => (JobStatus::RowCountMismatch, None, 0),
            Err(_) => (JobStatus::Failed, None, 0),
        };
        Self {
            name: name.to_string(),
            status,
            rows,
            differing_fields,
        }
    }
}

/// Per-job results of a whole batch, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub jobs: Vec<JobSummary>,
}

impl BatchSummary {
    /// Any job failed or was skipped
    pub fn has_failures(&self) -> bool {
        self.jobs
            .iter()
            .any(|j| matches!(j.status, JobStatus::Failed | JobStatus::Skipped))
    }

    /// Any job found differences or a row-count mismatch
    pub fn has_changes(&self) -> bool {
        self.jobs
            .iter()
            .any(|j| matches!(j.status, JobStatus::Differences | JobStatus::RowCountMismatch))
    }
}

/// Load both sides of `job` and compare them
pub fn run_job(job: &Job, config: &Config, parser: &dyn Parser) -> Result<ComparisonOutcome, DiffError> {
    let before = parser.parse(&job.before_path, &job.before_options(config))?;
    let after = parser.parse(&job.after_path, &job.after_options(config))?;
    compute_diff(&before, &after, config)
}

/// Run every job in order, reporting each result and carrying on after failures
pub fn run_batch(batch: &BatchConfig, parser: &dyn Parser, reporter: &mut dyn Reporter) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    // Skipped entries are reported where they sit in `input_files`
    let mut skipped = batch.skipped.iter().peekable();
    let mut position = 0;

    for job in &batch.jobs {
        while let Some(entry) = skipped.next_if(|e| e.index <= position) {
            skip_entry(entry, reporter, &mut summary)?;
            position += 1;
        }
        position += 1;

        log::info!("running job '{}'", job.name);
        reporter.job_started(job)?;

        let result = run_job(job, &batch.config, parser);
        match &result {
            Ok(outcome) => log::info!("job '{}' finished: {}", job.name, outcome.status()),
            Err(e) => log::warn!("job '{}' failed: {}", job.name, e),
        }

        reporter.job_finished(&JobReport {
            job,
            key_columns: &batch.config.key_columns,
            result: &result,
        })?;
        summary.jobs.push(JobSummary::from_result(&job.name, &result));
    }
    for entry in skipped {
        skip_entry(entry, reporter, &mut summary)?;
    }

    reporter.batch_finished(&summary)?;
    Ok(summary)
}

fn skip_entry(entry: &SkippedEntry, reporter: &mut dyn Reporter, summary: &mut BatchSummary) -> Result<()> {
    reporter.job_skipped(entry)?;
    summary.jobs.push(JobSummary {
        name: format!("input_files[{}]", entry.index),
        status: JobStatus::Skipped,
        rows: None,
        differing_fields: 0,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::model::{Row, Table};
    use crate::parser::ReadOptions;

    /// Serves tables from memory keyed by file name
    struct FakeParser;

    impl Parser for FakeParser {
        fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table, DiffError> {
            let header = ["HQ_CODE", "ID", "MBR_NO", "NAME"];
            let row = |name: &str| Row::from_pairs(2, [("HQ_CODE", "1"), ("ID", "1"), ("MBR_NO", "1"), ("NAME", name)]);
            match path.to_str() {
                Some("alice.txt") => Ok(Table::from_rows(path, &header, vec![row("Alice")])),
                Some("alicia.txt") => Ok(Table::from_rows(path, &header, vec![row("Alicia")])),
                _ => Err(DiffError::SourceUnavailable {
                    path: path.to_path_buf(),
                    reason: "not found".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Reporter for Recorder {
        fn job_started(&mut self, job: &Job) -> Result<()> {
            self.events.push(format!("start {}", job.name));
            Ok(())
        }

        fn job_finished(&mut self, report: &JobReport<'_>) -> Result<()> {
            let status = match report.result {
                Ok(outcome) => outcome.status().to_string(),
                Err(_) => "error".to_string(),
            };
            self.events.push(format!("finish {} {}", report.job.name, status));
            Ok(())
        }

        fn job_skipped(&mut self, entry: &SkippedEntry) -> Result<()> {
            self.events.push(format!("skip {}", entry.index));
            Ok(())
        }
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let batch = BatchConfig {
            config: Config::default(),
            jobs: vec![
                Job::new("missing", "nope.txt", "alice.txt"),
                Job::new("changed", "alice.txt", "alicia.txt"),
                Job::new("same", "alice.txt", "alice.txt"),
            ],
            skipped: vec![SkippedEntry {
                index: 1,
                entry: "{}".into(),
                reason: "missing field `name`".into(),
            }],
        };
        let mut recorder = Recorder::default();
        let summary = run_batch(&batch, &FakeParser, &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "start missing",
                "finish missing error",
                "skip 1",
                "start changed",
                "finish changed differences",
                "start same",
                "finish same identical",
            ]
        );
        let statuses: Vec<_> = summary.jobs.iter().map(|j| j.status).collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Failed,
                JobStatus::Skipped,
                JobStatus::Differences,
                JobStatus::Identical
            ]
        );
        assert_eq!(summary.jobs[2].differing_fields, 1);
        assert_eq!(summary.jobs[1].name, "input_files[1]");
        assert!(summary.has_failures());
        assert!(summary.has_changes());
    }

    #[test]
    fn test_trailing_skipped_entry_reported_last() {
        let batch = BatchConfig {
            config: Config::default(),
            jobs: vec![Job::new("same", "alice.txt", "alice.txt")],
            skipped: vec![
                SkippedEntry {
                    index: 0,
                    entry: "{}".into(),
                    reason: "missing field `name`".into(),
                },
                SkippedEntry {
                    index: 2,
                    entry: "[]".into(),
                    reason: "invalid type".into(),
                },
            ],
        };
        let mut recorder = Recorder::default();
        run_batch(&batch, &FakeParser, &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec!["skip 0", "start same", "finish same identical", "skip 2"]
        );
    }
}
