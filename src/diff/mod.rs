//! Diff engine for comparing tables by composite key

mod cell_diff;
mod row_diff;
mod schema_diff;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::DiffError;
use crate::model::{CellValue, KeyBuilder, KeyTuple, Table};

pub use cell_diff::CellComparator;
pub use row_diff::{AlignedPair, Alignment, RowMatcher};
pub use schema_diff::{SchemaChange, SchemaDiff};

/// One field that disagrees between an aligned row pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Key of the row
    pub key: KeyTuple,
    /// Column name
    pub field: String,
    pub before: CellValue,
    pub after: CellValue,
}

/// A source and how many data rows it held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub path: PathBuf,
    pub rows: usize,
}

/// Result of a comparison that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// The tables hold different numbers of rows; nothing else was compared
    RowCountMismatch { before: SourceCount, after: SourceCount },
    /// Every aligned row pair matched
    Identical {
        row_count: usize,
        warnings: Vec<SchemaChange>,
    },
    /// At least one field differs
    Differences {
        row_count: usize,
        /// Ordered by key, then by column
        differences: Vec<Difference>,
        warnings: Vec<SchemaChange>,
    },
}

impl ComparisonOutcome {
    /// True unless the tables compared cleanly
    pub fn has_changes(&self) -> bool {
        !matches!(self, ComparisonOutcome::Identical { .. })
    }

    pub fn differences(&self) -> &[Difference] {
        match self {
            ComparisonOutcome::Differences { differences, .. } => differences,
            _ => &[],
        }
    }

    pub fn warnings(&self) -> &[SchemaChange] {
        match self {
            ComparisonOutcome::RowCountMismatch { .. } => &[],
            ComparisonOutcome::Identical { warnings, .. }
            | ComparisonOutcome::Differences { warnings, .. } => warnings,
        }
    }

    /// Number of distinct keys with at least one difference
    pub fn differing_rows(&self) -> usize {
        let diffs = self.differences();
        let mut count = 0;
        let mut last: Option<&KeyTuple> = None;
        for d in diffs {
            if last != Some(&d.key) {
                count += 1;
                last = Some(&d.key);
            }
        }
        count
    }

    /// Short machine-friendly status name
    pub fn status(&self) -> &'static str {
        match self {
            ComparisonOutcome::RowCountMismatch { .. } => "row_count_mismatch",
            ComparisonOutcome::Identical { .. } => "identical",
            ComparisonOutcome::Differences { .. } => "differences",
        }
    }
}

/// Main diff engine
pub struct DiffEngine {
    keys: KeyBuilder,
}

impl DiffEngine {
    /// Create a new diff engine with configuration
    pub fn new(config: &Config) -> Self {
        Self {
            keys: KeyBuilder::new(config.key_columns.clone()),
        }
    }

    /// Compare two tables
    pub fn diff(&self, before: &Table, after: &Table) -> Result<ComparisonOutcome, DiffError> {
        if before.row_count() != after.row_count() {
            log::info!(
                "row count mismatch: {} has {} rows, {} has {} rows",
                before.source.display(),
                before.row_count(),
                after.source.display(),
                after.row_count()
            );
            return Ok(ComparisonOutcome::RowCountMismatch {
                before: SourceCount {
                    path: before.source.clone(),
                    rows: before.row_count(),
                },
                after: SourceCount {
                    path: after.source.clone(),
                    rows: after.row_count(),
                },
            });
        }

        let alignment = RowMatcher::new(&self.keys).align(before, after)?;
        let unmatched = alignment.unmatched();
        if unmatched > 0 {
            log::warn!(
                "{} keys appear in only one of {} and {}",
                unmatched,
                before.source.display(),
                after.source.display()
            );
        }

        let warnings = SchemaDiff::compare(before, after);
        for change in &warnings {
            log::warn!("{}", change);
        }

        let columns = SchemaDiff::union_columns(before, after);
        let comparator = CellComparator::new(&columns);
        let mut differences = Vec::new();
        for pair in alignment.pairs() {
            comparator.compare(&pair, &mut differences);
        }

        let row_count = before.row_count();
        log::debug!("{} differing fields across {} rows", differences.len(), row_count);

        if differences.is_empty() {
            Ok(ComparisonOutcome::Identical {
                row_count,
                warnings,
            })
        } else {
            Ok(ComparisonOutcome::Differences {
                row_count,
                differences,
                warnings,
            })
        }
    }
}

/// Convenience function to compute diff
pub fn compute_diff(before: &Table, after: &Table, config: &Config) -> Result<ComparisonOutcome, DiffError> {
    DiffEngine::new(config).diff(before, after)
}
