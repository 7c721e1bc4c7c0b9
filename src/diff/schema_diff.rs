//! Schema comparison logic

use serde::{Deserialize, Serialize};

use crate::model::Table;

/// A column present on only one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaChange {
    /// Column exists only in the "after" table
    ColumnAdded { name: String, index: usize },
    /// Column exists only in the "before" table
    ColumnRemoved { name: String, index: usize },
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ColumnAdded { name, index } => {
                write!(f, "+ {} (only in after file, position {})", name, index)
            }
            SchemaChange::ColumnRemoved { name, index } => {
                write!(f, "- {} (only in before file, position {})", name, index)
            }
        }
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Columns present on only one side, removed ones first
    pub fn compare(before: &Table, after: &Table) -> Vec<SchemaChange> {
        let removed = before
            .columns
            .iter()
            .filter(|c| !after.has_column(&c.name))
            .map(|c| SchemaChange::ColumnRemoved {
                name: c.name.clone(),
                index: c.index,
            });
        let added = after
            .columns
            .iter()
            .filter(|c| !before.has_column(&c.name))
            .map(|c| SchemaChange::ColumnAdded {
                name: c.name.clone(),
                index: c.index,
            });
        removed.chain(added).collect()
    }

    /// Union of both headers: "before" order, then after-only columns in "after" order
    pub fn union_columns<'a>(before: &'a Table, after: &'a Table) -> Vec<&'a str> {
        before
            .column_names()
            .chain(after.column_names().filter(|name| !before.has_column(name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_sided_columns() {
        let before = Table::from_rows("a", &["ID", "NAME", "FAX"], []);
        let after = Table::from_rows("b", &["ID", "EMAIL", "NAME"], []);

        assert_eq!(
            SchemaDiff::compare(&before, &after),
            vec![
                SchemaChange::ColumnRemoved { name: "FAX".into(), index: 2 },
                SchemaChange::ColumnAdded { name: "EMAIL".into(), index: 1 },
            ]
        );
        assert_eq!(
            SchemaDiff::union_columns(&before, &after),
            vec!["ID", "NAME", "FAX", "EMAIL"]
        );
    }
}
