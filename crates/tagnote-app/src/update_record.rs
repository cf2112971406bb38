//! Update-record use case.
//!
//! The stored record is replaced wholesale: new content, re-parsed tag set,
//! refreshed `updated_at`, same identity and `created_at`. Unlike create,
//! tags minted here are persisted immediately (outside the later
//! transaction) so a failed update can at worst leave extra tags behind,
//! never a half-written record. Tags orphaned by the tag-set change are
//! swept inside the same transaction as the record write.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use tagnote_core::duplicate::DuplicateChecker;
use tagnote_core::error::{Error, Result};
use tagnote_core::factory::TagFactory;
use tagnote_core::models::{RecordContent, UpdateRecordRequest, UpdateRecordResponse};
use tagnote_core::parse::TagParser;
use tagnote_core::traits::{RecordRepository, TagRepository, UnitOfWorkProvider};

use crate::transaction::rollback_quietly;

/// Replaces a record's content and tag set.
pub struct UpdateRecordUseCase {
    records: Arc<dyn RecordRepository>,
    tags: Arc<dyn TagRepository>,
    provider: Arc<dyn UnitOfWorkProvider>,
    parser: TagParser,
    factory: TagFactory,
    duplicates: DuplicateChecker,
}

impl UpdateRecordUseCase {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        tags: Arc<dyn TagRepository>,
        provider: Arc<dyn UnitOfWorkProvider>,
    ) -> Self {
        Self {
            records,
            tags,
            provider,
            parser: TagParser::default(),
            factory: TagFactory::default(),
            duplicates: DuplicateChecker::new(),
        }
    }

    pub async fn execute(&self, req: UpdateRecordRequest) -> Result<UpdateRecordResponse> {
        if req.id.is_nil() {
            return Err(Error::Validation("Record id must not be nil".to_string()));
        }
        let content = RecordContent::new(req.content)?;

        let existing = self
            .records
            .find_by_id(req.id)
            .await?
            .ok_or(Error::RecordNotFound(req.id))?;

        // Resolve the new tag set; tags minted here are persisted right away.
        let values = self.parser.parse(content.as_str());
        let mut tag_ids: HashSet<Uuid> = HashSet::new();
        for value in &values {
            match self.tags.find_by_normalized_value(value).await? {
                Some(tag) => {
                    tag_ids.insert(tag.id());
                }
                None => {
                    let tag = self.factory.create_from_string(value)?;
                    self.tags.save(&tag).await?;
                    tag_ids.insert(tag.id());
                }
            }
        }

        let updated = existing.with_update(content, tag_ids);

        // Duplicate check against every other record with this exact tag set.
        let candidates = self
            .records
            .find_by_tag_set(&updated.tag_ids(), Some(updated.id()))
            .await?;
        if let Some(duplicate) = self
            .duplicates
            .find_duplicates_in(&updated, &candidates)
            .first()
        {
            debug!(
                subsystem = "app",
                component = "update_record",
                record_id = %updated.id(),
                duplicate_of = %duplicate.id(),
                "Rejecting update: tag set already taken"
            );
            return Err(Error::DuplicateRecord(duplicate.id()));
        }

        let mut uow = self.provider.unit_of_work().await?;
        uow.begin().await?;
        let outcome: Result<Vec<Uuid>> = async {
            uow.update_record(&updated).await?;
            let orphaned = uow.find_orphaned_tags().await?;
            let orphan_ids: Vec<Uuid> = orphaned.iter().map(|t| t.id()).collect();
            if !orphan_ids.is_empty() {
                uow.delete_tags(&orphan_ids).await?;
            }
            uow.commit().await?;
            Ok(orphan_ids)
        }
        .await;
        let removed_tag_ids = match outcome {
            Ok(ids) => ids,
            Err(err) => {
                rollback_quietly(uow.as_mut()).await;
                return Err(err);
            }
        };

        info!(
            subsystem = "app",
            component = "update_record",
            op = "execute",
            record_id = %updated.id(),
            tag_count = updated.tag_count(),
            removed_tags = removed_tag_ids.len(),
            "Record updated"
        );

        Ok(UpdateRecordResponse {
            record: updated,
            removed_tag_ids,
        })
    }
}
