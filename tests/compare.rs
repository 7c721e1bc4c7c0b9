use std::fs;

use tempfile::TempDir;
use termcolor::NoColor;

use keydiff::config::{BatchConfig, Config, Job, OutputFormat};
use keydiff::diff::ComparisonOutcome;
use keydiff::model::CellValue;
use keydiff::output::{FormatterReporter, OutputFactory};
use keydiff::parser::DelimitedParser;
use keydiff::runner::{run_batch, run_job, JobStatus};

fn config() -> Config {
    Config::default()
        .with_key_columns(vec!["ID".into()])
        .with_delimiter(b'|')
        .with_skip_rows(1, 0)
}

#[test]
fn banner_row_and_absent_cells_from_files() {
    let dir = TempDir::new().unwrap();
    let before = dir.path().join("before.txt");
    let after = dir.path().join("after.txt");
    fs::write(&before, "generated 2024-05-01\n ID | NAME | EMAIL\n1|Ann|\n2|Ben|ben@x\n").unwrap();
    fs::write(&after, "ID|NAME|EMAIL\n2|Ben\n1|Ann|\n").unwrap();

    let job = Job::new("people", &before, &after);
    let outcome = run_job(&job, &config(), &DelimitedParser).unwrap();

    let diffs = outcome.differences();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].key.values(), ["2".to_string()]);
    assert_eq!(diffs[0].field, "EMAIL");
    assert_eq!(diffs[0].before, CellValue::from("ben@x"));
    assert!(diffs[0].after.is_absent());

    // Reading empty cells as absent leaves row 1 clean either way
    let lenient = config().with_empty_as_absent(true);
    let outcome = run_job(&job, &lenient, &DelimitedParser).unwrap();
    assert_eq!(outcome.differing_rows(), 1);
}

#[test]
fn json_report_through_reporter() {
    let dir = TempDir::new().unwrap();
    let before = dir.path().join("before.txt");
    let after = dir.path().join("after.txt");
    fs::write(&before, "banner\nID|NAME\n1|Ann\n").unwrap();
    fs::write(&after, "ID|NAME\n1|Ann\n").unwrap();

    let batch = BatchConfig::single(
        config().with_output_format(OutputFormat::Json),
        Job::new("people", &before, &after),
    );
    let mut reporter = FormatterReporter::new(
        OutputFactory::create(batch.config.output_format),
        NoColor::new(Vec::new()),
    );
    let summary = run_batch(&batch, &DelimitedParser, &mut reporter).unwrap();

    assert_eq!(summary.jobs[0].status, JobStatus::Identical);
    assert!(!summary.has_changes());

    let out = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["status"], "identical");
    assert_eq!(lines[0]["row_count"], 1);
    assert_eq!(lines[1]["summary"]["jobs"][0]["status"], "identical");
}

#[test]
fn row_count_mismatch_is_an_outcome() {
    let dir = TempDir::new().unwrap();
    let before = dir.path().join("before.txt");
    let after = dir.path().join("after.txt");
    fs::write(&before, "banner\nID|NAME\n1|Ann\n2|Ben\n").unwrap();
    fs::write(&after, "ID|NAME\n1|Ann\n").unwrap();

    let outcome = run_job(&Job::new("people", &before, &after), &config(), &DelimitedParser).unwrap();
    match outcome {
        ComparisonOutcome::RowCountMismatch { before: b, after: a } => {
            assert_eq!((b.rows, a.rows), (2, 1));
            assert_eq!(b.path, before);
            assert_eq!(a.path, after);
        }
        other => panic!("expected row count mismatch, got {:?}", other),
    }
}
