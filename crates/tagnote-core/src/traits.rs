//! Port traits for tagnote abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. Repository methods
//! return `Result` for every expected failure mode; they never panic for
//! absent rows.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Record, Tag, TagPrefixMatch, TagUsage};

// =============================================================================
// RECORD REPOSITORY
// =============================================================================

/// Repository for record CRUD and tag-set queries.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Fetch a record by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>>;

    /// List every record.
    async fn find_all(&self) -> Result<Vec<Record>>;

    /// Content/tag-value substring search at the storage layer.
    async fn search(&self, query: &str) -> Result<Vec<Record>>;

    /// Records referencing at least one of the given tags.
    async fn find_by_tag_ids(&self, tag_ids: &[Uuid]) -> Result<Vec<Record>>;

    /// Records whose tag-ID set is exactly equal to `tag_ids`, optionally
    /// excluding one record (the one being updated).
    async fn find_by_tag_set(
        &self,
        tag_ids: &HashSet<Uuid>,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Record>>;

    /// Persist a new record.
    async fn save(&self, record: &Record) -> Result<()>;

    /// Replace a stored record (content, tag links, updated_at).
    async fn update(&self, record: &Record) -> Result<()>;

    /// Delete a record and its tag links.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Persist multiple records in a single transaction.
    async fn save_batch(&self, records: &[Record]) -> Result<()>;

    /// Delete every record.
    async fn delete_all(&self) -> Result<()>;

    /// Total record count.
    async fn count(&self) -> Result<i64>;

    /// Check whether a record exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for tag lookup, creation, and cleanup.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Fetch a tag by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>>;

    /// List every tag.
    async fn find_all(&self) -> Result<Vec<Tag>>;

    /// Look up a tag by its normalized value (the natural key).
    async fn find_by_normalized_value(&self, value: &str) -> Result<Option<Tag>>;

    /// Look up several tags by normalized value; absent values are simply
    /// missing from the result.
    async fn find_by_normalized_values(&self, values: &[String]) -> Result<Vec<Tag>>;

    /// Prefix search over normalized values, scored and sorted by score
    /// descending, then alphabetically.
    async fn find_by_prefix(&self, prefix: &str, limit: i64) -> Result<Vec<TagPrefixMatch>>;

    /// Every tag with its referencing-record count.
    async fn get_usage_info(&self) -> Result<Vec<TagUsage>>;

    /// Tags referenced by zero records.
    async fn find_orphaned(&self) -> Result<Vec<Tag>>;

    /// Persist a tag. Saving an already-present normalized value is not an
    /// error (the storage layer's uniqueness constraint absorbs the race).
    async fn save(&self, tag: &Tag) -> Result<()>;

    /// Persist multiple tags in a single transaction.
    async fn save_batch(&self, tags: &[Tag]) -> Result<()>;

    /// Delete a tag by ID.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Delete several tags; returns the number actually removed.
    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64>;

    /// Total tag count.
    async fn count(&self) -> Result<i64>;
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

/// A request-scoped transactional boundary.
///
/// Strict two-phase discipline: `begin` precedes all writes, `commit` only
/// after every write succeeded, and any failure after `begin` must be
/// followed by `rollback` before the error is surfaced. The write methods
/// operate inside the active transaction and observe its uncommitted state
/// (an orphan query after a staged delete sees the delete).
#[async_trait]
pub trait UnitOfWork: Send {
    /// Open the transaction. Fails if one is already active.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the active transaction. Fails if none is active.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the active transaction. Fails if none is active.
    async fn rollback(&mut self) -> Result<()>;

    /// Whether a transaction is currently open.
    fn is_active(&self) -> bool;

    /// Persist a new record inside the transaction.
    async fn save_record(&mut self, record: &Record) -> Result<()>;

    /// Replace a stored record inside the transaction.
    async fn update_record(&mut self, record: &Record) -> Result<()>;

    /// Delete a record (and its tag links) inside the transaction.
    async fn delete_record(&mut self, id: Uuid) -> Result<()>;

    /// Persist tags inside the transaction.
    async fn save_tags(&mut self, tags: &[Tag]) -> Result<()>;

    /// Tags referenced by zero records, as seen by the transaction.
    async fn find_orphaned_tags(&mut self) -> Result<Vec<Tag>>;

    /// Delete tags inside the transaction; returns the number removed.
    async fn delete_tags(&mut self, ids: &[Uuid]) -> Result<u64>;
}

/// Supplies a fresh unit of work per use-case invocation.
///
/// Units of work are request-scoped and never shared across concurrent
/// invocations.
#[async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    async fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork>>;
}
