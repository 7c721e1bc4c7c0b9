//! keydiff - Keyed cell-level diff for tab-separated exports
//!
//! Rows of a "before" and an "after" file are matched by a composite key and
//! compared field by field as raw text.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod runner;

pub use config::{BatchConfig, Config, Job};
pub use diff::{compute_diff, ComparisonOutcome, Difference};
pub use error::{ConfigError, DiffError};
pub use model::Table;
