//! Configuration handling for keydiff

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::model::DEFAULT_KEY_COLUMNS;
use crate::parser::ReadOptions;

/// Output format for comparison reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every comparison in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Columns whose values identify a row
    pub key_columns: Vec<String>,
    /// Field delimiter byte
    pub delimiter: u8,
    /// Lines to skip before the header in "before" files
    pub before_skip_rows: usize,
    /// Lines to skip before the header in "after" files
    pub after_skip_rows: usize,
    /// Read empty cells as absent instead of empty strings
    pub empty_as_absent: bool,
    /// Output format
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_columns: DEFAULT_KEY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            delimiter: b'\t',
            before_skip_rows: 0,
            after_skip_rows: 0,
            empty_as_absent: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Set key columns for row matching
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set banner lines to skip on each side
    pub fn with_skip_rows(mut self, before: usize, after: usize) -> Self {
        self.before_skip_rows = before;
        self.after_skip_rows = after;
        self
    }

    pub fn with_empty_as_absent(mut self, empty_as_absent: bool) -> Self {
        self.empty_as_absent = empty_as_absent;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// One named comparison between a "before" and an "after" file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub before_path: PathBuf,
    pub after_path: PathBuf,
    /// Overrides [`Config::before_skip_rows`]
    pub before_skip_rows: Option<usize>,
    /// Overrides [`Config::after_skip_rows`]
    pub after_skip_rows: Option<usize>,
}

impl Job {
    pub fn new(name: impl Into<String>, before_path: impl Into<PathBuf>, after_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            before_path: before_path.into(),
            after_path: after_path.into(),
            before_skip_rows: None,
            after_skip_rows: None,
        }
    }

    /// Reader options for the "before" file
    pub fn before_options(&self, config: &Config) -> ReadOptions {
        ReadOptions {
            delimiter: config.delimiter,
            skip_rows: self.before_skip_rows.unwrap_or(config.before_skip_rows),
            empty_as_absent: config.empty_as_absent,
        }
    }

    /// Reader options for the "after" file
    pub fn after_options(&self, config: &Config) -> ReadOptions {
        ReadOptions {
            delimiter: config.delimiter,
            skip_rows: self.after_skip_rows.unwrap_or(config.after_skip_rows),
            empty_as_absent: config.empty_as_absent,
        }
    }
}

/// A job list entry that could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position in `input_files`
    pub index: usize,
    /// The entry as written
    pub entry: String,
    pub reason: String,
}

/// A loaded job configuration file
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub config: Config,
    pub jobs: Vec<Job>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Deserialize)]
struct RawBatchConfig {
    key_columns: Option<Vec<String>>,
    delimiter: Option<String>,
    #[serde(default = "default_before_skip_rows")]
    before_skip_rows: usize,
    #[serde(default)]
    after_skip_rows: usize,
    #[serde(default)]
    empty_as_absent: bool,
    #[serde(default)]
    input_files: Vec<Value>,
}

#[derive(Deserialize)]
struct RawJob {
    name: String,
    before_path: PathBuf,
    after_path: PathBuf,
    before_skip_rows: Option<usize>,
    after_skip_rows: Option<usize>,
}

/// "Before" exports carry one banner line above the header
fn default_before_skip_rows() -> usize {
    1
}

impl BatchConfig {
    /// A batch holding a single job
    pub fn single(config: Config, job: Job) -> Self {
        Self {
            config,
            jobs: vec![job],
            skipped: Vec::new(),
        }
    }

    /// Load a JSON job file. Relative job paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&text, base_dir, path)
    }

    /// Parse a JSON job file already read into memory.
    ///
    /// `origin` only names the file in error messages.
    pub fn from_json_str(text: &str, base_dir: &Path, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawBatchConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        if raw.input_files.is_empty() {
            return Err(ConfigError::NoJobs(origin.to_path_buf()));
        }

        let mut config = Config::default().with_skip_rows(raw.before_skip_rows, raw.after_skip_rows);
        config.empty_as_absent = raw.empty_as_absent;
        if let Some(keys) = raw.key_columns {
            config.key_columns = parse_key_columns(keys)?;
        }
        if let Some(delimiter) = raw.delimiter {
            config.delimiter = parse_delimiter(&delimiter)?;
        }

        let mut jobs = Vec::new();
        let mut skipped = Vec::new();
        for (index, value) in raw.input_files.into_iter().enumerate() {
            let entry = value.to_string();
            match serde_json::from_value::<RawJob>(value) {
                Ok(job) => jobs.push(Job {
                    name: job.name,
                    before_path: base_dir.join(job.before_path),
                    after_path: base_dir.join(job.after_path),
                    before_skip_rows: job.before_skip_rows,
                    after_skip_rows: job.after_skip_rows,
                }),
                Err(e) => {
                    log::warn!("Skipping malformed job entry #{}: {}", index, entry);
                    skipped.push(SkippedEntry {
                        index,
                        entry,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            config,
            jobs,
            skipped,
        })
    }
}

/// Parse a delimiter given as a single ASCII character, or the `\t` escape
pub fn parse_delimiter(s: &str) -> Result<u8, ConfigError> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(ConfigError::Delimiter(s.to_string())),
    }
}

/// Trim key column names, rejecting an empty list or a blank name
pub fn parse_key_columns(keys: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let trimmed: Vec<String> = keys.iter().map(|k| k.trim().to_string()).collect();
    if trimmed.is_empty() || trimmed.iter().any(String::is_empty) {
        return Err(ConfigError::KeyColumns(keys));
    }
    Ok(trimmed)
}
