//! Duplicate detection on tag sets.
//!
//! Two records are duplicates iff their tag-ID sets are equal as sets.
//! Content plays no part; two empty-tag-set records are duplicates.

use crate::models::Record;

/// Detects records carrying identical tag sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateChecker;

impl DuplicateChecker {
    pub fn new() -> Self {
        Self
    }

    /// Exact set equality on tag IDs. Symmetric.
    pub fn is_duplicate(&self, a: &Record, b: &Record) -> bool {
        a.has_same_tag_set(b)
    }

    /// All candidates whose tag set equals the target's, excluding the
    /// target itself (compared by identity).
    pub fn find_duplicates_in<'a>(
        &self,
        target: &Record,
        candidates: &'a [Record],
    ) -> Vec<&'a Record> {
        candidates
            .iter()
            .filter(|candidate| candidate.id() != target.id())
            .filter(|candidate| self.is_duplicate(target, candidate))
            .collect()
    }
}
