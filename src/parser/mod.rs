//! Parser layer for reading tabular sources

mod delimited;

use std::path::Path;

use crate::error::DiffError;
use crate::model::Table;

pub use self::delimited::DelimitedParser;

/// How to read one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Raw lines to discard before the header row
    pub skip_rows: usize,
    /// Load empty cells as absent rather than as empty strings
    pub empty_as_absent: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            skip_rows: 0,
            empty_as_absent: false,
        }
    }
}

/// Anything that can turn a file into a [`Table`].
///
/// Loaders for other document kinds plug in here; the differ only sees the
/// resulting table.
pub trait Parser {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table, DiffError>;
}
