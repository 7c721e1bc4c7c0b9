//! Row alignment by composite key

use std::cmp::Ordering;

use crate::error::DiffError;
use crate::model::{KeyBuilder, KeyTuple, Row, Side, Table};

/// A before/after row pair sharing one key.
///
/// A side is `None` when its table has no row with this key.
#[derive(Debug, Clone, Copy)]
pub struct AlignedPair<'a> {
    pub key: &'a KeyTuple,
    pub before: Option<&'a Row>,
    pub after: Option<&'a Row>,
}

/// Keyed rows of both tables, sorted ascending by key
pub struct Alignment<'a> {
    before: Vec<(KeyTuple, &'a Row)>,
    after: Vec<(KeyTuple, &'a Row)>,
}

impl<'a> Alignment<'a> {
    /// Pairs in ascending key order
    pub fn pairs(&self) -> Vec<AlignedPair<'_>> {
        let mut pairs = Vec::with_capacity(self.before.len().max(self.after.len()));
        let (mut i, mut j) = (0, 0);

        loop {
            let order = match (self.before.get(i), self.after.get(j)) {
                (Some((bk, _)), Some((ak, _))) => bk.cmp(ak),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            let pair = match order {
                Ordering::Equal => {
                    let (key, before) = &self.before[i];
                    let after = self.after[j].1;
                    i += 1;
                    j += 1;
                    AlignedPair {
                        key,
                        before: Some(*before),
                        after: Some(after),
                    }
                }
                Ordering::Less => {
                    let (key, before) = &self.before[i];
                    i += 1;
                    AlignedPair {
                        key,
                        before: Some(*before),
                        after: None,
                    }
                }
                Ordering::Greater => {
                    let (key, after) = &self.after[j];
                    j += 1;
                    AlignedPair {
                        key,
                        before: None,
                        after: Some(*after),
                    }
                }
            };
            pairs.push(pair);
        }

        pairs
    }

    /// Keys found on only one side
    pub fn unmatched(&self) -> usize {
        self.pairs()
            .iter()
            .filter(|p| p.before.is_none() || p.after.is_none())
            .count()
    }
}

/// Row matcher using sorted keys
pub struct RowMatcher<'k> {
    keys: &'k KeyBuilder,
}

impl<'k> RowMatcher<'k> {
    pub fn new(keys: &'k KeyBuilder) -> Self {
        Self { keys }
    }

    /// Key and sort both tables, validating key columns on each side
    pub fn align<'a>(&self, before: &'a Table, after: &'a Table) -> Result<Alignment<'a>, DiffError> {
        Ok(Alignment {
            before: self.keys.index(before, Side::Before)?,
            after: self.keys.index(after, Side::After)?,
        })
    }
}
