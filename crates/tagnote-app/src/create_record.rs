//! Create-record use case.
//!
//! Tags parsed from the content are resolved against the store; tags that
//! do not exist yet are constructed up front but persisted only inside the
//! transaction, together with the record. The duplicate check runs before
//! the transaction opens, so a rejected request leaves no partial state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use tagnote_core::duplicate::DuplicateChecker;
use tagnote_core::error::{Error, Result};
use tagnote_core::factory::TagFactory;
use tagnote_core::models::{CreateRecordRequest, CreateRecordResponse, Record, RecordContent, Tag};
use tagnote_core::parse::TagParser;
use tagnote_core::traits::{RecordRepository, TagRepository, UnitOfWorkProvider};

use crate::transaction::rollback_quietly;

/// Creates a record from raw content, creating missing tags on the way.
pub struct CreateRecordUseCase {
    records: Arc<dyn RecordRepository>,
    tags: Arc<dyn TagRepository>,
    provider: Arc<dyn UnitOfWorkProvider>,
    parser: TagParser,
    factory: TagFactory,
    duplicates: DuplicateChecker,
}

impl CreateRecordUseCase {
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

    pub async fn execute(&self, req: CreateRecordRequest) -> Result<CreateRecordResponse> {
        let content = RecordContent::new(req.content)?;

        // Resolve parsed tag values: reuse stored tags, construct the rest.
        // New tags stay unpersisted until the transaction below.
        let values = self.parser.parse(content.as_str());
        let mut tag_ids: HashSet<Uuid> = HashSet::new();
        let mut new_tags: Vec<Tag> = Vec::new();
        for value in &values {
            match self.tags.find_by_normalized_value(value).await? {
                Some(tag) => {
                    tag_ids.insert(tag.id());
                }
                None => {
                    let tag = self.factory.create_from_string(value)?;
                    tag_ids.insert(tag.id());
                    new_tags.push(tag);
                }
            }
        }

        let record = Record::new(content, tag_ids);

        // Duplicate check against records sharing the exact tag set,
        // before any transaction is opened.
        let candidates = self
            .records
            .find_by_tag_set(&record.tag_ids(), None)
            .await?;
        if let Some(duplicate) = self
            .duplicates
            .find_duplicates_in(&record, &candidates)
            .first()
        {
            debug!(
                subsystem = "app",
                component = "create_record",
                record_id = %record.id(),
                duplicate_of = %duplicate.id(),
                "Rejecting create: tag set already taken"
            );
            return Err(Error::DuplicateRecord(duplicate.id()));
        }

        let mut uow = self.provider.unit_of_work().await?;
        uow.begin().await?;
        let outcome = async {
            uow.save_tags(&new_tags).await?;
            uow.save_record(&record).await?;
            uow.commit().await
        }
        .await;
        if let Err(err) = outcome {
            rollback_quietly(uow.as_mut()).await;
            return Err(err);
        }

        info!(
            subsystem = "app",
            component = "create_record",
            op = "execute",
            record_id = %record.id(),
            tag_count = record.tag_count(),
            created_tags = new_tags.len(),
            "Record created"
        );

        Ok(CreateRecordResponse {
            record,
            created_tags: new_tags,
        })
    }
}
