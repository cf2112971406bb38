//! Export / import use cases.
//!
//! Exports replace tag IDs with normalized tag values so a dump is portable
//! across stores. Import resolves values back to tags (creating missing
//! ones), reconstructs records with their original IDs and timestamps, and
//! writes everything in a single transaction. Records whose ID already
//! exists are skipped, never overwritten.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tagnote_core::error::{Error, Result};
use tagnote_core::export::{ExportEnvelope, ImportSummary, RecordExport};
use tagnote_core::factory::TagFactory;
use tagnote_core::models::{Record, RecordContent, Tag};
use tagnote_core::traits::{RecordRepository, TagRepository, UnitOfWorkProvider};

use crate::transaction::rollback_quietly;

/// Serializes the whole store into a portable envelope.
pub struct ExportRecordsUseCase {
    records: Arc<dyn RecordRepository>,
    tags: Arc<dyn TagRepository>,
}

impl ExportRecordsUseCase {
    pub fn new(records: Arc<dyn RecordRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { records, tags }
    }

    pub async fn execute(&self) -> Result<ExportEnvelope> {
        let mut records = self.records.find_all().await?;
        let tags = self.tags.find_all().await?;
        let values: HashMap<Uuid, String> = tags
            .into_iter()
            .map(|t| (t.id(), t.normalized_value().to_string()))
            .collect();

        // Stable output: records by creation time, tag values alphabetical.
        records.sort_by_key(|r| (r.created_at(), r.id()));

        let exported: Vec<RecordExport> = records
            .iter()
            .map(|record| {
                let mut tag_values: Vec<String> = record
                    .tag_ids()
                    .iter()
                    .filter_map(|id| values.get(id).cloned())
                    .collect();
                tag_values.sort();
                RecordExport {
                    id: record.id(),
                    content: record.content().as_str().to_string(),
                    tags: tag_values,
                    created_at: record.created_at(),
                    updated_at: record.updated_at(),
                }
            })
            .collect();

        info!(
            subsystem = "app",
            component = "export_records",
            op = "execute",
            result_count = exported.len(),
            "Export complete"
        );
        Ok(ExportEnvelope::new(exported))
    }
}

/// Re-creates records and tags from a portable envelope.
pub struct ImportRecordsUseCase {
    records: Arc<dyn RecordRepository>,
    tags: Arc<dyn TagRepository>,
    provider: Arc<dyn UnitOfWorkProvider>,
    factory: TagFactory,
}

impl ImportRecordsUseCase {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        tags: Arc<dyn TagRepository>,
        provider: Arc<dyn UnitOfWorkProvider>,
    ) -> Self {
        Self {
            records,
            tags,
            provider,
            factory: TagFactory::default(),
        }
    }

    pub async fn execute(&self, envelope: &ExportEnvelope) -> Result<ImportSummary> {
        if envelope.version > ExportEnvelope::CURRENT_VERSION {
            return Err(Error::UseCase(format!(
                "unsupported export payload version {} (newest known is {})",
                envelope.version,
                ExportEnvelope::CURRENT_VERSION
            )));
        }

        let mut skipped = 0usize;
        let mut new_tags: Vec<Tag> = Vec::new();
        let mut pending: HashMap<String, Uuid> = HashMap::new();
        let mut to_save: Vec<Record> = Vec::new();

        for entry in &envelope.records {
            if self.records.exists(entry.id).await? {
                skipped += 1;
                continue;
            }

            let content = RecordContent::new(entry.content.clone())?;
            let mut tag_ids: HashSet<Uuid> = HashSet::new();
            for value in &entry.tags {
                let id = if let Some(&id) = pending.get(value) {
                    id
                } else if let Some(tag) = self.tags.find_by_normalized_value(value).await? {
                    tag.id()
                } else {
                    let tag = self.factory.create_from_string(value)?;
                    let id = tag.id();
                    pending.insert(tag.normalized_value().to_string(), id);
                    new_tags.push(tag);
                    id
                };
                tag_ids.insert(id);
            }

            // Import preserves the original identity and timestamps.
            to_save.push(Record::from_parts(
                entry.id,
                content,
                tag_ids,
                entry.created_at,
                entry.updated_at,
            )?);
        }

        let mut uow = self.provider.unit_of_work().await?;
        uow.begin().await?;
        let outcome = async {
            uow.save_tags(&new_tags).await?;
            for record in &to_save {
                uow.save_record(record).await?;
            }
            uow.commit().await
        }
        .await;
        if let Err(err) = outcome {
            rollback_quietly(uow.as_mut()).await;
            return Err(err);
        }

        info!(
            subsystem = "app",
            component = "import_records",
            op = "execute",
            imported = to_save.len(),
            skipped,
            created_tags = new_tags.len(),
            "Import complete"
        );

        Ok(ImportSummary {
            imported: to_save.len(),
            skipped,
            created_tags: new_tags.len(),
        })
    }
}
