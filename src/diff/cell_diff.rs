//! Cell-level comparison logic

use crate::model::{CellValue, Row};

use super::row_diff::AlignedPair;
use super::Difference;

/// Compares aligned rows field by field on raw text.
///
/// No trimming, case folding, or numeric parsing happens here: two cells
/// match only when both are absent or both hold the same string.
pub struct CellComparator<'c> {
    columns: &'c [&'c str],
}

impl<'c> CellComparator<'c> {
    /// Compare over `columns`, usually the union of both headers
    pub fn new(columns: &'c [&'c str]) -> Self {
        Self { columns }
    }

    /// Compare two cell values for equality
    pub fn equal(a: &CellValue, b: &CellValue) -> bool {
        a == b
    }

    /// Append one [`Difference`] per disagreeing field of `pair`
    pub fn compare(&self, pair: &AlignedPair<'_>, out: &mut Vec<Difference>) {
        for &column in self.columns {
            let before = cell(pair.before, column);
            let after = cell(pair.after, column);
            if !Self::equal(before, after) {
                out.push(Difference {
                    key: pair.key.clone(),
                    field: column.to_string(),
                    before: before.clone(),
                    after: after.clone(),
                });
            }
        }
    }
}

/// A row that is missing altogether reads as absent in every column
fn cell<'r>(row: Option<&'r Row>, column: &str) -> &'r CellValue {
    static ABSENT: CellValue = CellValue::Absent;
    row.map_or(&ABSENT, |r| r.get(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyTuple;

    #[test]
    fn test_raw_text_equality() {
        assert!(CellComparator::equal(&"1".into(), &"1".into()));
        assert!(!CellComparator::equal(&"1.0".into(), &"1".into()));
        assert!(!CellComparator::equal(&"Alice".into(), &"alice".into()));
        assert!(!CellComparator::equal(&"".into(), &CellValue::Absent));
        assert!(CellComparator::equal(&CellValue::Absent, &CellValue::Absent));
    }

    #[test]
    fn test_missing_row_reports_present_fields() {
        let key = KeyTuple::from_iter(["7"]);
        let row = Row::from_pairs(2, [("ID", "7"), ("NAME", "Bob")]);
        let pair = AlignedPair {
            key: &key,
            before: Some(&row),
            after: None,
        };
        let columns = ["ID", "NAME", "EMAIL"];
        let mut out = Vec::new();
        CellComparator::new(&columns).compare(&pair, &mut out);

        let fields: Vec<_> = out.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["ID", "NAME"]);
        assert!(out.iter().all(|d| d.after.is_absent()));
    }
}
