//! Domain entities and request/response types.
//!
//! `Tag` and `Record` are identity-based entities: equality compares IDs
//! only, never attribute values. Both are immutable after construction;
//! a content or tag change on a `Record` produces a new instance that keeps
//! the original ID and creation timestamp.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// TAG
// =============================================================================

/// A normalized tag.
///
/// The `normalized_value` is the tag's natural key: canonical lowercase,
/// diacritic-stripped, Unicode-normalized, no whitespace, non-empty.
/// Construction goes through [`crate::factory::TagFactory`], which enforces
/// those invariants; `Tag` itself never re-validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    id: Uuid,
    normalized_value: String,
    created_at: DateTime<Utc>,
}

impl Tag {
    /// Construct a tag from already-validated parts.
    ///
    /// Callers outside the factory use this only to reconstitute a tag
    /// from storage, where the value was validated on the way in.
    pub fn from_parts(id: Uuid, normalized_value: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            normalized_value,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn normalized_value(&self) -> &str {
        &self.normalized_value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl std::hash::Hash for Tag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// =============================================================================
// RECORD CONTENT
// =============================================================================

/// Raw record content.
///
/// Value object: must be non-empty after trimming. The stored string keeps
/// its original whitespace; only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordContent(String);

impl RecordContent {
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Record content cannot be empty".to_string(),
            ));
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// A free-text record annotated with a set of tag IDs.
///
/// Invariants:
/// - `tag_ids` is exposed only as a defensive copy.
/// - `updated_at >= created_at`.
/// - Updates produce a new instance sharing the ID, preserving `created_at`
///   and refreshing `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    id: Uuid,
    content: RecordContent,
    tag_ids: HashSet<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a fresh record with a new ID and current timestamps.
    pub fn new(content: RecordContent, tag_ids: HashSet<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            content,
            tag_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a record with explicit fields (storage and import paths).
    ///
    /// Fails if `updated_at` precedes `created_at`.
    pub fn from_parts(
        id: Uuid,
        content: RecordContent,
        tag_ids: HashSet<Uuid>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        if updated_at < created_at {
            return Err(Error::Validation(format!(
                "Record {} has updated_at earlier than created_at",
                id
            )));
        }
        Ok(Self {
            id,
            content,
            tag_ids,
            created_at,
            updated_at,
        })
    }

    /// Produce the updated version of this record: same ID and `created_at`,
    /// new content and tag set, `updated_at` refreshed to now.
    pub fn with_update(&self, content: RecordContent, tag_ids: HashSet<Uuid>) -> Self {
        Self {
            id: self.id,
            content,
            tag_ids,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &RecordContent {
        &self.content
    }

    /// Defensive copy of the tag ID set. Mutating the returned set never
    /// affects the stored record.
    pub fn tag_ids(&self) -> HashSet<Uuid> {
        self.tag_ids.clone()
    }

    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tag_ids.contains(&tag_id)
    }

    pub fn tag_count(&self) -> usize {
        self.tag_ids.len()
    }

    /// Set equality on tag IDs, independent of insertion order.
    pub fn has_same_tag_set(&self, other: &Record) -> bool {
        self.tag_ids == other.tag_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

// =============================================================================
// USE-CASE REQUESTS / RESPONSES
// =============================================================================

/// Request to create a record from raw content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub content: String,
}

/// Response for record creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub record: Record,
    /// Tags that did not exist before this operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_tags: Vec<Tag>,
}

/// Request to replace a record's content (and thereby its tag set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    pub id: Uuid,
    pub content: String,
}

/// Response for record update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecordResponse {
    pub record: Record,
    /// Tags left orphaned by the update and removed alongside it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_tag_ids: Vec<Uuid>,
}

/// Response for record deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRecordResponse {
    pub record_id: Uuid,
    /// Tags left orphaned by the deletion and removed alongside it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_tag_ids: Vec<Uuid>,
}

/// A tag together with the number of records referencing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagUsage {
    pub tag: Tag,
    pub record_count: i64,
}

/// A prefix-search hit with its match score.
///
/// Score is `prefix_len / value_len` in (0, 1]; 1.0 means exact match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPrefixMatch {
    pub tag: Tag,
    pub match_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(s: &str) -> RecordContent {
        RecordContent::new(s).unwrap()
    }

    #[test]
    fn test_record_content_rejects_empty() {
        assert!(RecordContent::new("").is_err());
        assert!(RecordContent::new("   \t\n").is_err());
        assert!(RecordContent::new("x").is_ok());
    }

    #[test]
    fn test_record_content_preserves_whitespace() {
        let c = content("  hello  ");
        assert_eq!(c.as_str(), "  hello  ");
    }

    #[test]
    fn test_tag_equality_is_identity_based() {
        let now = Utc::now();
        let a = Tag::from_parts(Uuid::new_v4(), "rust".to_string(), now);
        let b = Tag::from_parts(Uuid::new_v4(), "rust".to_string(), now);
        let a2 = Tag::from_parts(a.id(), "other".to_string(), now);

        assert_ne!(a, b);
        assert_eq!(a, a2);
    }

    #[test]
    fn test_record_equality_is_identity_based() {
        let a = Record::new(content("one"), HashSet::new());
        let b = Record::new(content("one"), HashSet::new());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_record_tag_ids_is_defensive_copy() {
        let t1 = Uuid::new_v4();
        let record = Record::new(content("x"), HashSet::from([t1]));

        let mut copy = record.tag_ids();
        copy.insert(Uuid::new_v4());
        copy.remove(&t1);

        assert_eq!(record.tag_count(), 1);
        assert!(record.has_tag(t1));
    }

    #[test]
    fn test_record_update_preserves_identity_and_created_at() {
        let record = Record::new(content("before"), HashSet::new());
        let updated = record.with_update(content("after"), HashSet::from([Uuid::new_v4()]));

        assert_eq!(updated.id(), record.id());
        assert_eq!(updated.created_at(), record.created_at());
        assert_eq!(updated.content().as_str(), "after");
        assert!(updated.updated_at() >= record.updated_at());
        assert!(updated.updated_at() >= updated.created_at());
    }

    #[test]
    fn test_record_from_parts_rejects_inverted_timestamps() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::seconds(60);
        let result = Record::from_parts(
            Uuid::new_v4(),
            content("x"),
            HashSet::new(),
            now,
            earlier,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_record_from_parts_accepts_equal_timestamps() {
        let now = Utc::now();
        let result = Record::from_parts(Uuid::new_v4(), content("x"), HashSet::new(), now, now);
        assert!(result.is_ok());
    }

    #[test]
    fn test_has_same_tag_set_ignores_order() {
        let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());
        let a = Record::new(content("a"), HashSet::from([t1, t2]));
        let b = Record::new(content("b"), HashSet::from([t2, t1]));
        assert!(a.has_same_tag_set(&b));

        let c = Record::new(content("c"), HashSet::from([t1]));
        assert!(!a.has_same_tag_set(&c));
    }
}
