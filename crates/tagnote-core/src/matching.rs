//! Query matching against a record's tag set.
//!
//! Query semantics: AND across query terms, OR across a record's tag values
//! per term, substring containment on normalized values. An empty query
//! matches every record.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Record, Tag};
use crate::normalize::TagNormalizer;

/// Decides whether a record matches a free-text tag query.
#[derive(Debug, Clone, Default)]
pub struct RecordMatcher {
    normalizer: TagNormalizer,
}

impl RecordMatcher {
    pub fn new(normalizer: TagNormalizer) -> Self {
        Self { normalizer }
    }

    /// Split a query into normalized, non-empty terms.
    pub fn query_terms(&self, query: &str) -> Vec<String> {
        query
            .split_whitespace()
            .map(|t| self.normalizer.normalize(t))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// True when every query term is a substring of at least one of the
    /// record's resolved tag values.
    ///
    /// Tag IDs missing from `tag_lookup` contribute no matchable value and
    /// are skipped. A record with zero resolvable tags matches only the
    /// empty query.
    pub fn matches(&self, record: &Record, query: &str, tag_lookup: &HashMap<Uuid, Tag>) -> bool {
        let terms = self.query_terms(query);
        if terms.is_empty() {
            return true;
        }

        let tag_values: Vec<&str> = record
            .tag_ids()
            .iter()
            .filter_map(|id| tag_lookup.get(id))
            .map(|tag| tag.normalized_value())
            .collect();

        if tag_values.is_empty() {
            return false;
        }

        terms
            .iter()
            .all(|term| tag_values.iter().any(|value| value.contains(term)))
    }

    /// Filter a record list down to those matching the query.
    pub fn filter<'a>(
        &self,
        records: &'a [Record],
        query: &str,
        tag_lookup: &HashMap<Uuid, Tag>,
    ) -> Vec<&'a Record> {
        records
            .iter()
            .filter(|record| self.matches(record, query, tag_lookup))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordContent;
    use chrono::Utc;
    use std::collections::HashSet;

    fn tag(value: &str) -> Tag {
        Tag::from_parts(Uuid::new_v4(), value.to_string(), Utc::now())
    }

    fn record_with(tags: &[&Tag]) -> Record {
        Record::new(
            RecordContent::new("content").unwrap(),
            tags.iter().map(|t| t.id()).collect::<HashSet<_>>(),
        )
    }

    fn lookup(tags: &[&Tag]) -> HashMap<Uuid, Tag> {
        tags.iter().map(|t| (t.id(), (*t).clone())).collect()
    }

    #[test]
    fn test_and_semantics_across_terms() {
        let js = tag("javascript");
        let react = tag("react");
        let record = record_with(&[&js, &react]);
        let tags = lookup(&[&js, &react]);
        let m = RecordMatcher::default();

        assert!(!m.matches(&record, "javascript python", &tags));
        assert!(m.matches(&record, "javascript react", &tags));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let js = tag("javascript");
        let tagged = record_with(&[&js]);
        let untagged = record_with(&[]);
        let tags = lookup(&[&js]);
        let m = RecordMatcher::default();

        assert!(m.matches(&tagged, "", &tags));
        assert!(m.matches(&tagged, "   ", &tags));
        assert!(m.matches(&untagged, "", &tags));
    }

    #[test]
    fn test_untagged_record_matches_only_empty_query() {
        let record = record_with(&[]);
        let m = RecordMatcher::default();
        assert!(!m.matches(&record, "anything", &HashMap::new()));
        assert!(m.matches(&record, "", &HashMap::new()));
    }

    #[test]
    fn test_substring_matching() {
        let js = tag("javascript");
        let record = record_with(&[&js]);
        let tags = lookup(&[&js]);
        let m = RecordMatcher::default();

        assert!(m.matches(&record, "java", &tags)); // prefix
        assert!(m.matches(&record, "script", &tags)); // infix
        assert!(!m.matches(&record, "javascripts", &tags));
    }

    #[test]
    fn test_query_terms_are_normalized() {
        let cafe = tag("cafe");
        let record = record_with(&[&cafe]);
        let tags = lookup(&[&cafe]);
        let m = RecordMatcher::default();

        assert!(m.matches(&record, "CAFÉ", &tags));
    }

    #[test]
    fn test_unresolvable_tag_ids_are_skipped() {
        let js = tag("javascript");
        let record = record_with(&[&js]);
        let m = RecordMatcher::default();

        // Lookup doesn't know the record's tag: nothing to match against.
        assert!(!m.matches(&record, "javascript", &HashMap::new()));
        assert!(m.matches(&record, "", &HashMap::new()));
    }

    #[test]
    fn test_or_across_tags_per_term() {
        let rust = tag("rust");
        let tokio = tag("tokio");
        let record = record_with(&[&rust, &tokio]);
        let tags = lookup(&[&rust, &tokio]);
        let m = RecordMatcher::default();

        // Each term satisfied by a different tag
        assert!(m.matches(&record, "rust tok", &tags));
    }

    #[test]
    fn test_filter_returns_matching_subset() {
        let rust = tag("rust");
        let python = tag("python");
        let a = record_with(&[&rust]);
        let b = record_with(&[&python]);
        let tags = lookup(&[&rust, &python]);
        let m = RecordMatcher::default();

        let records = vec![a.clone(), b];
        let hits = m.filter(&records, "rust", &tags);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), a.id());
    }
}
