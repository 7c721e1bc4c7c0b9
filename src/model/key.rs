//! Primary key handling utilities

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::table::{Row, Side, Table};
use crate::error::{DiffError, KeyProblem};

/// Key columns used when nothing else is configured
pub const DEFAULT_KEY_COLUMNS: [&str; 3] = ["HQ_CODE", "ID", "MBR_NO"];

/// The key-column values of one row, in key-column order.
///
/// Ordering is lexicographic over the components, so `("1", "10")` sorts
/// before `("1", "2")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTuple(pub Vec<String>);

impl KeyTuple {
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for KeyTuple {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        KeyTuple(iter.into_iter().map(Into::into).collect())
    }
}

/// Builder for computing composite keys
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    columns: Vec<String>,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

impl KeyBuilder {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Build a key from a row, or `None` if any key cell is absent
    pub fn build_key(&self, row: &Row) -> Option<KeyTuple> {
        self.columns
            .iter()
            .map(|c| row.get(c).as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(KeyTuple)
    }

    /// Key every row of `table` and sort ascending by key.
    ///
    /// Fails if a key column is missing from the header, a row has no value
    /// for a key column, or two rows share a key.
    pub fn index<'a>(&self, table: &'a Table, side: Side) -> Result<Vec<(KeyTuple, &'a Row)>, DiffError> {
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !table.has_column(c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(self.error(table, side, missing, KeyProblem::MissingColumn));
        }

        let mut seen: FxHashMap<KeyTuple, usize> = FxHashMap::default();
        let mut keyed = Vec::with_capacity(table.row_count());

        for row in &table.rows {
            let Some(key) = self.build_key(row) else {
                let absent = self
                    .columns
                    .iter()
                    .filter(|c| row.get(c).is_absent())
                    .cloned()
                    .collect();
                return Err(self.error(
                    table,
                    side,
                    absent,
                    KeyProblem::AbsentValue {
                        line: row.source_line,
                    },
                ));
            };

            if let Some(&first_line) = seen.get(&key) {
                return Err(self.error(
                    table,
                    side,
                    self.columns.clone(),
                    KeyProblem::DuplicateKey {
                        key,
                        first_line,
                        line: row.source_line,
                    },
                ));
            }
            seen.insert(key.clone(), row.source_line);
            keyed.push((key, row));
        }

        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        log::debug!(
            "keyed {} rows of {} ({}) on {:?}",
            keyed.len(),
            table.source.display(),
            side,
            self.columns
        );
        Ok(keyed)
    }

    fn error(&self, table: &Table, side: Side, columns: Vec<String>, problem: KeyProblem) -> DiffError {
        DiffError::KeyColumnError {
            side,
            path: table.source.clone(),
            columns,
            problem,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(line: usize, hq: &str, id: &str, mbr: &str) -> Row {
        Row::from_pairs(line, [("HQ_CODE", hq), ("ID", id), ("MBR_NO", mbr)])
    }

    fn table(rows: Vec<Row>) -> Table {
        Table::from_rows("members.txt", &["HQ_CODE", "ID", "MBR_NO"], rows)
    }

    #[test]
    fn test_index_sorts_lexicographically() {
        let t = table(vec![
            member(2, "1", "2", "1"),
            member(3, "1", "10", "1"),
            member(4, "0", "9", "9"),
        ]);
        let keys: Vec<_> = KeyBuilder::default()
            .index(&t, Side::Before)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![
                KeyTuple::from_iter(["0", "9", "9"]),
                KeyTuple::from_iter(["1", "10", "1"]),
                KeyTuple::from_iter(["1", "2", "1"]),
            ]
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let t = table(vec![member(2, "1", "1", "1"), member(3, "1", "1", "1")]);
        match KeyBuilder::default().index(&t, Side::After) {
            Err(DiffError::KeyColumnError {
                side,
                problem: KeyProblem::DuplicateKey { first_line, line, .. },
                ..
            }) => {
                assert_eq!(side, Side::After);
                assert_eq!((first_line, line), (2, 3));
            }
            other => panic!("expected duplicate key error, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_key_value_rejected() {
        let t = table(vec![Row::from_pairs(2, [("HQ_CODE", "1"), ("ID", "1")])]);
        match KeyBuilder::default().index(&t, Side::Before) {
            Err(DiffError::KeyColumnError { columns, problem, .. }) => {
                assert_eq!(columns, vec!["MBR_NO".to_string()]);
                assert_eq!(problem, KeyProblem::AbsentValue { line: 2 });
            }
            other => panic!("expected absent key error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_key_value_is_a_value() {
        let t = table(vec![member(2, "1", "", "1")]);
        assert!(KeyBuilder::default().index(&t, Side::Before).is_ok());
    }
}
