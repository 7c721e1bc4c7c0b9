//! Error types for loading and comparing tables.
//!
//! A row-count mismatch is not an error: it is a complete
//! [`ComparisonOutcome`](crate::diff::ComparisonOutcome) so batch callers can
//! move on to the next job.

use std::fmt;
use std::path::PathBuf;

use crate::model::{KeyTuple, Side};

/// Errors that end a single comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A source file is missing, unreadable, or has no usable header
    #[error("source unavailable: {}: {reason}", .path.display())]
    SourceUnavailable {
        /// Path that could not be loaded
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Key columns are missing, have absent values, or do not identify rows uniquely
    #[error(
        "key column error in {side} file {}: {problem} [{}]",
        .path.display(),
        .columns.join(", ")
    )]
    KeyColumnError {
        /// Which side of the comparison failed
        side: Side,
        /// Source of the offending table
        path: PathBuf,
        /// Offending key columns
        columns: Vec<String>,
        problem: KeyProblem,
    },
}

impl DiffError {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        DiffError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// What is wrong with the key columns of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyProblem {
    /// The columns are not in the header
    MissingColumn,
    /// A row has no value for the columns
    AbsentValue { line: usize },
    /// Two rows share the same key tuple
    DuplicateKey {
        key: KeyTuple,
        first_line: usize,
        line: usize,
    },
}

impl fmt::Display for KeyProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyProblem::MissingColumn => write!(f, "key column not found in header"),
            KeyProblem::AbsentValue { line } => write!(f, "key value absent on line {}", line),
            KeyProblem::DuplicateKey {
                key,
                first_line,
                line,
            } => write!(
                f,
                "duplicate key {} on lines {} and {}",
                key, first_line, line
            ),
        }
    }
}

/// Errors raised while loading a job configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("'input_files' list is missing or empty in {}", .0.display())]
    NoJobs(PathBuf),

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(String),

    #[error("key columns must be one or more non-blank names, got {0:?}")]
    KeyColumns(Vec<String>),
}
