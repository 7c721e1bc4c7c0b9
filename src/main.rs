//! keydiff - Keyed cell-level diff for tab-separated exports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use keydiff::config::{parse_delimiter, parse_key_columns, BatchConfig, Config, Job, OutputFormat};
use keydiff::output::stdout_reporter;
use keydiff::parser::DelimitedParser;
use keydiff::runner::run_batch;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliColor {
    Auto,
    Always,
    Never,
}

impl From<CliColor> for ColorChoice {
    fn from(c: CliColor) -> Self {
        match c {
            CliColor::Auto => ColorChoice::Auto,
            CliColor::Always => ColorChoice::Always,
            CliColor::Never => ColorChoice::Never,
        }
    }
}

/// Compare tab-separated exports row by row on a composite key
#[derive(Parser, Debug)]
#[command(name = "keydiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// "Before" file to compare
    #[arg(required_unless_present = "config")]
    before_file: Option<PathBuf>,

    /// "After" file to compare
    #[arg(required_unless_present = "config")]
    after_file: Option<PathBuf>,

    /// JSON file listing comparison jobs (input_files)
    #[arg(short, long, conflicts_with_all = ["before_file", "after_file"])]
    config: Option<PathBuf>,

    /// Key column(s) identifying a row (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// Field delimiter (single character, or \t)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Lines to skip before the header of the "before" file
    #[arg(long)]
    before_skip_rows: Option<usize>,

    /// Lines to skip before the header of the "after" file
    #[arg(long)]
    after_skip_rows: Option<usize>,

    /// Read empty cells as absent values
    #[arg(long)]
    empty_as_absent: bool,

    /// Label for a single comparison
    #[arg(long)]
    name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CliOutputFormat,

    /// When to colour text output
    #[arg(long, value_enum, default_value = "auto")]
    color: CliColor,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Changes) => ExitCode::from(1),
        Ok(Outcome::Failures) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

enum Outcome {
    Clean,
    Changes,
    Failures,
}

fn run(cli: Cli) -> Result<Outcome> {
    let mut batch = match &cli.config {
        Some(path) => BatchConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let before = cli.before_file.clone().context("before_file is required")?;
            let after = cli.after_file.clone().context("after_file is required")?;
            let name = cli
                .name
                .clone()
                .unwrap_or_else(|| format!("{} vs {}", before.display(), after.display()));
            BatchConfig::single(Config::default(), Job::new(name, before, after))
        }
    };

    apply_overrides(&mut batch.config, &cli)?;
    log::debug!("effective settings: {:?}", batch.config);

    let mut reporter = stdout_reporter(batch.config.output_format, cli.color.into());
    let summary = run_batch(&batch, &DelimitedParser, &mut reporter)?;

    Ok(if summary.has_failures() {
        Outcome::Failures
    } else if summary.has_changes() {
        Outcome::Changes
    } else {
        Outcome::Clean
    })
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if !cli.key.is_empty() {
        config.key_columns = parse_key_columns(cli.key.clone())?;
    }
    if let Some(delimiter) = &cli.delimiter {
        config.delimiter = parse_delimiter(delimiter)?;
    }
    if let Some(n) = cli.before_skip_rows {
        config.before_skip_rows = n;
    }
    if let Some(n) = cli.after_skip_rows {
        config.after_skip_rows = n;
    }
    if cli.empty_as_absent {
        config.empty_as_absent = true;
    }
    config.output_format = cli.format.into();
    Ok(())
}
