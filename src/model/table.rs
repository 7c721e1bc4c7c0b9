//! Table, Row, and Cell data structures

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::Column;

/// A cell value as read from the source.
///
/// Cells are opaque text: nothing is parsed into numbers or dates, so `"1.0"`
/// and `"1"` stay different. `Absent` means the row carries no value for the
/// column at all and is never equal to `Text("")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Absent,
    Text(String),
}

static ABSENT: CellValue = CellValue::Absent;

impl CellValue {
    /// Check if the value is absent
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// The text of a present value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Absent => None,
            CellValue::Text(s) => Some(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Absent,
        }
    }
}

/// A row in the table: column name to cell value.
///
/// A column missing from the map reads as [`CellValue::Absent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
    /// Original line number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(source_line: usize) -> Self {
        Self {
            cells: IndexMap::new(),
            source_line,
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(source_line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new(source_line);
        for (k, v) in pairs {
            row.insert(k, v);
        }
        row
    }

    /// Set a cell value, replacing any previous one
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Get a cell value by column name
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&ABSENT)
    }
}

/// Which side of a comparison a table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => write!(f, "before"),
            Side::After => write!(f, "after"),
        }
    }
}

/// A table loaded from one source
#[derive(Debug, Clone)]
pub struct Table {
    /// Where the table was read from
    pub source: PathBuf,
    /// Column definitions in header order
    pub columns: Vec<Column>,
    /// All rows in the table, in source order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(source: impl Into<PathBuf>, columns: Vec<Column>) -> Self {
        Self {
            source: source.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and rows of `(column, value)` pairs
    pub fn from_rows<I>(source: impl Into<PathBuf>, header: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let columns = header
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(*name, i))
            .collect();
        let mut table = Self::new(source, columns);
        table.rows.extend(rows);
        table
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Column names in header order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
