//! In-memory adapters for the port traits.
//!
//! Backing store for use-case tests: repositories read committed state, the
//! unit of work operates on a working copy that is swapped in on commit and
//! discarded on rollback, so a transaction observes its own uncommitted
//! writes (the orphan query sees a staged delete) while outside readers do
//! not. Failure injection flags drive the atomicity tests.
//!
//! Always compiled (not `#[cfg(test)]`) so integration tests under `tests/`
//! can use it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use tagnote_core::error::{Error, Result};
use tagnote_core::models::{Record, Tag, TagPrefixMatch, TagUsage};
use tagnote_core::traits::{
    RecordRepository, TagRepository, UnitOfWork, UnitOfWorkProvider,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    records: HashMap<Uuid, Record>,
    tags: HashMap<Uuid, Tag>,
}

impl StoreState {
    fn orphaned_tags(&self) -> Vec<Tag> {
        let referenced: HashSet<Uuid> = self
            .records
            .values()
            .flat_map(|record| record.tag_ids())
            .collect();
        let mut orphans: Vec<Tag> = self
            .tags
            .values()
            .filter(|tag| !referenced.contains(&tag.id()))
            .cloned()
            .collect();
        orphans.sort_by(|a, b| a.normalized_value().cmp(b.normalized_value()));
        orphans
    }

    fn has_tag_value(&self, value: &str) -> bool {
        self.tags.values().any(|t| t.normalized_value() == value)
    }
}

/// Injectable failure points for transaction tests.
#[derive(Debug, Default)]
pub struct FailureFlags {
    pub fail_begin: bool,
    pub fail_commit: bool,
    pub fail_save_record: bool,
    pub fail_delete_tags: bool,
}

#[derive(Debug, Default)]
struct TxCounters {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Shared in-memory store. Cloning yields handles to the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    failures: Arc<Mutex<FailureFlags>>,
    counters: Arc<TxCounters>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_repository(&self) -> Arc<dyn RecordRepository> {
        Arc::new(InMemoryRecordRepository {
            store: self.clone(),
        })
    }

    pub fn tag_repository(&self) -> Arc<dyn TagRepository> {
        Arc::new(InMemoryTagRepository {
            store: self.clone(),
        })
    }

    pub fn provider(&self) -> Arc<dyn UnitOfWorkProvider> {
        Arc::new(self.clone())
    }

    pub fn set_fail_begin(&self, on: bool) {
        self.failures.lock().expect("failure flags poisoned").fail_begin = on;
    }

    pub fn set_fail_commit(&self, on: bool) {
        self.failures.lock().expect("failure flags poisoned").fail_commit = on;
    }

    pub fn set_fail_save_record(&self, on: bool) {
        self.failures
            .lock()
            .expect("failure flags poisoned")
            .fail_save_record = on;
    }

    pub fn set_fail_delete_tags(&self, on: bool) {
        self.failures
            .lock()
            .expect("failure flags poisoned")
            .fail_delete_tags = on;
    }

    pub fn begin_count(&self) -> usize {
        self.counters.begins.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }

    /// Committed record count, bypassing the repository.
    pub fn record_count(&self) -> usize {
        self.state.lock().expect("store poisoned").records.len()
    }

    /// Committed tag count, bypassing the repository.
    pub fn tag_count(&self) -> usize {
        self.state.lock().expect("store poisoned").tags.len()
    }

    /// Committed tag values, sorted.
    pub fn tag_values(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .state
            .lock()
            .expect("store poisoned")
            .tags
            .values()
            .map(|t| t.normalized_value().to_string())
            .collect();
        values.sort();
        values
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store poisoned")
    }

    fn flag<F: Fn(&FailureFlags) -> bool>(&self, pick: F) -> bool {
        pick(&self.failures.lock().expect("failure flags poisoned"))
    }
}

// =============================================================================
// REPOSITORIES (committed state)
// =============================================================================

struct InMemoryRecordRepository {
    store: InMemoryStore,
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>> {
        Ok(self.store.lock_state().records.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = self.store.lock_state().records.values().cloned().collect();
        records.sort_by_key(|r| (r.created_at(), r.id()));
        Ok(records)
    }

    async fn search(&self, query: &str) -> Result<Vec<Record>> {
        let needle = query.to_lowercase();
        let state = self.store.lock_state();
        let mut hits: Vec<Record> = state
            .records
            .values()
            .filter(|record| {
                record.content().as_str().to_lowercase().contains(&needle)
                    || record.tag_ids().iter().any(|id| {
                        state
                            .tags
                            .get(id)
                            .is_some_and(|t| t.normalized_value().contains(&needle))
                    })
            })
            .cloned()
            .collect();
        hits.sort_by_key(|r| (r.created_at(), r.id()));
        Ok(hits)
    }

    async fn find_by_tag_ids(&self, tag_ids: &[Uuid]) -> Result<Vec<Record>> {
        let wanted: HashSet<Uuid> = tag_ids.iter().copied().collect();
        Ok(self
            .store
            .lock_state()
            .records
            .values()
            .filter(|record| record.tag_ids().iter().any(|id| wanted.contains(id)))
            .cloned()
            .collect())
    }

    async fn find_by_tag_set(
        &self,
        tag_ids: &HashSet<Uuid>,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Record>> {
        Ok(self
            .store
            .lock_state()
            .records
            .values()
            .filter(|record| Some(record.id()) != exclude_id)
            .filter(|record| record.tag_ids() == *tag_ids)
            .cloned()
            .collect())
    }

    async fn save(&self, record: &Record) -> Result<()> {
        let mut state = self.store.lock_state();
        if state.records.contains_key(&record.id()) {
            return Err(Error::Internal(format!(
                "record {} already exists",
                record.id()
            )));
        }
        state.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &Record) -> Result<()> {
        let mut state = self.store.lock_state();
        if !state.records.contains_key(&record.id()) {
            return Err(Error::RecordNotFound(record.id()));
        }
        state.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.lock_state().records.remove(&id);
        Ok(())
    }

    async fn save_batch(&self, records: &[Record]) -> Result<()> {
        let mut state = self.store.lock_state();
        for record in records {
            state.records.insert(record.id(), record.clone());
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.store.lock_state().records.clear();
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.store.lock_state().records.len() as i64)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.lock_state().records.contains_key(&id))
    }
}

struct InMemoryTagRepository {
    store: InMemoryStore,
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        Ok(self.store.lock_state().tags.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.store.lock_state().tags.values().cloned().collect();
        tags.sort_by(|a, b| a.normalized_value().cmp(b.normalized_value()));
        Ok(tags)
    }

    async fn find_by_normalized_value(&self, value: &str) -> Result<Option<Tag>> {
        Ok(self
            .store
            .lock_state()
            .tags
            .values()
            .find(|t| t.normalized_value() == value)
            .cloned())
    }

    async fn find_by_normalized_values(&self, values: &[String]) -> Result<Vec<Tag>> {
        let wanted: HashSet<&str> = values.iter().map(String::as_str).collect();
        Ok(self
            .store
            .lock_state()
            .tags
            .values()
            .filter(|t| wanted.contains(t.normalized_value()))
            .cloned()
            .collect())
    }

    async fn find_by_prefix(&self, prefix: &str, limit: i64) -> Result<Vec<TagPrefixMatch>> {
        let prefix_len = prefix.chars().count();
        let mut matches: Vec<TagPrefixMatch> = self
            .store
            .lock_state()
            .tags
            .values()
            .filter(|t| t.normalized_value().starts_with(prefix))
            .map(|t| TagPrefixMatch {
                match_score: prefix_len as f32 / t.normalized_value().chars().count() as f32,
                tag: t.clone(),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.tag.normalized_value().cmp(b.tag.normalized_value()))
        });
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }

    async fn get_usage_info(&self) -> Result<Vec<TagUsage>> {
        let state = self.store.lock_state();
        let mut usage: Vec<TagUsage> = state
            .tags
            .values()
            .map(|tag| TagUsage {
                record_count: state
                    .records
                    .values()
                    .filter(|r| r.has_tag(tag.id()))
                    .count() as i64,
                tag: tag.clone(),
            })
            .collect();
        usage.sort_by(|a, b| a.tag.normalized_value().cmp(b.tag.normalized_value()));
        Ok(usage)
    }

    async fn find_orphaned(&self) -> Result<Vec<Tag>> {
        Ok(self.store.lock_state().orphaned_tags())
    }

    async fn save(&self, tag: &Tag) -> Result<()> {
        let mut state = self.store.lock_state();
        if state.has_tag_value(tag.normalized_value()) {
            return Ok(());
        }
        state.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn save_batch(&self, tags: &[Tag]) -> Result<()> {
        let mut state = self.store.lock_state();
        for tag in tags {
            if !state.has_tag_value(tag.normalized_value()) {
                state.tags.insert(tag.id(), tag.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.lock_state().tags.remove(&id);
        Ok(())
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64> {
        let mut state = self.store.lock_state();
        let mut removed = 0u64;
        for id in ids {
            if state.tags.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.store.lock_state().tags.len() as i64)
    }
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

#[async_trait]
impl UnitOfWorkProvider for InMemoryStore {
    async fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            working: None,
        }))
    }
}

/// Transaction over a working copy of the store.
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
    working: Option<StoreState>,
}

impl InMemoryUnitOfWork {
    fn working_mut(&mut self) -> Result<&mut StoreState> {
        self.working
            .as_mut()
            .ok_or_else(|| Error::Transaction("no active transaction".to_string()))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn begin(&mut self) -> Result<()> {
        if self.working.is_some() {
            return Err(Error::Transaction("transaction already active".to_string()));
        }
        if self.store.flag(|f| f.fail_begin) {
            return Err(Error::Transaction("begin failed (injected)".to_string()));
        }
        self.store.counters.begins.fetch_add(1, Ordering::SeqCst);
        self.working = Some(self.store.lock_state().clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let Some(working) = self.working.take() else {
            return Err(Error::Transaction("no active transaction".to_string()));
        };
        if self.store.flag(|f| f.fail_commit) {
            // Transaction stays open so the caller's rollback can land.
            self.working = Some(working);
            return Err(Error::Transaction("commit failed (injected)".to_string()));
        }
        *self.store.lock_state() = working;
        self.store.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.working.take().is_none() {
            return Err(Error::Transaction("no active transaction".to_string()));
        }
        self.store.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.working.is_some()
    }

    async fn save_record(&mut self, record: &Record) -> Result<()> {
        if self.store.flag(|f| f.fail_save_record) {
            return Err(Error::Internal("save_record failed (injected)".to_string()));
        }
        let working = self.working_mut()?;
        if working.records.contains_key(&record.id()) {
            return Err(Error::Internal(format!(
                "record {} already exists",
                record.id()
            )));
        }
        working.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update_record(&mut self, record: &Record) -> Result<()> {
        let working = self.working_mut()?;
        if !working.records.contains_key(&record.id()) {
            return Err(Error::RecordNotFound(record.id()));
        }
        working.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete_record(&mut self, id: Uuid) -> Result<()> {
        self.working_mut()?.records.remove(&id);
        Ok(())
    }

    async fn save_tags(&mut self, tags: &[Tag]) -> Result<()> {
        let working = self.working_mut()?;
        for tag in tags {
            if !working.has_tag_value(tag.normalized_value()) {
                working.tags.insert(tag.id(), tag.clone());
            }
        }
        Ok(())
    }

    async fn find_orphaned_tags(&mut self) -> Result<Vec<Tag>> {
        Ok(self.working_mut()?.orphaned_tags())
    }

    async fn delete_tags(&mut self, ids: &[Uuid]) -> Result<u64> {
        if self.store.flag(|f| f.fail_delete_tags) {
            return Err(Error::Internal("delete_tags failed (injected)".to_string()));
        }
        let working = self.working_mut()?;
        let mut removed = 0u64;
        for id in ids {
            if working.tags.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
