//! Record search use case.
//!
//! Two complementary paths: tag search runs the in-process matcher
//! (AND-of-substring over normalized tag values), content search delegates
//! to the repository's storage-level substring scan.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use tagnote_core::error::Result;
use tagnote_core::matching::RecordMatcher;
use tagnote_core::models::{Record, Tag};
use tagnote_core::traits::{RecordRepository, TagRepository};

/// Searches records by tag query or content substring.
pub struct SearchRecordsUseCase {
    records: Arc<dyn RecordRepository>,
    tags: Arc<dyn TagRepository>,
    matcher: RecordMatcher,
}

impl SearchRecordsUseCase {
    pub fn new(records: Arc<dyn RecordRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self {
            records,
            tags,
            matcher: RecordMatcher::default(),
        }
    }

    /// Records whose tag set satisfies every term of the query.
    ///
    /// An empty query returns every record.
    pub async fn by_tags(&self, query: &str) -> Result<Vec<Record>> {
        let records = self.records.find_all().await?;
        let tags = self.tags.find_all().await?;
        let lookup: HashMap<Uuid, Tag> = tags.into_iter().map(|t| (t.id(), t)).collect();

        let hits: Vec<Record> = self
            .matcher
            .filter(&records, query, &lookup)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            subsystem = "app",
            component = "search_records",
            op = "by_tags",
            query,
            result_count = hits.len(),
            "Tag search complete"
        );
        Ok(hits)
    }

    /// Records whose content or tag values contain the query substring.
    pub async fn by_content(&self, query: &str) -> Result<Vec<Record>> {
        let hits = self.records.search(query).await?;
        debug!(
            subsystem = "app",
            component = "search_records",
            op = "by_content",
            query,
            result_count = hits.len(),
            "Content search complete"
        );
        Ok(hits)
    }
}
