//! Delete-record use case.
//!
//! Removing a record can strand tags; the orphan sweep runs inside the same
//! transaction as the delete so either both happen or neither does. The
//! response reports which tags went with the record.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tagnote_core::error::{Error, Result};
use tagnote_core::models::DeleteRecordResponse;
use tagnote_core::traits::{RecordRepository, UnitOfWorkProvider};

use crate::transaction::rollback_quietly;

/// Deletes a record and sweeps any tags it leaves orphaned.
pub struct DeleteRecordUseCase {
    records: Arc<dyn RecordRepository>,
    provider: Arc<dyn UnitOfWorkProvider>,
}

impl DeleteRecordUseCase {
    pub fn new(records: Arc<dyn RecordRepository>, provider: Arc<dyn UnitOfWorkProvider>) -> Self {
        Self { records, provider }
    }

    pub async fn execute(&self, id: Uuid) -> Result<DeleteRecordResponse> {
        if id.is_nil() {
            return Err(Error::Validation("Record id must not be nil".to_string()));
        }

        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or(Error::RecordNotFound(id))?;

        let mut uow = self.provider.unit_of_work().await?;
        uow.begin().await?;
        let outcome: Result<Vec<Uuid>> = async {
            uow.delete_record(record.id()).await?;
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
            component = "delete_record",
            op = "execute",
            record_id = %record.id(),
            removed_tags = removed_tag_ids.len(),
            "Record deleted"
        );

        Ok(DeleteRecordResponse {
            record_id: record.id(),
            removed_tag_ids,
        })
    }
}
