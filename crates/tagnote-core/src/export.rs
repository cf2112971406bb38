//! Portable export/import DTOs.
//!
//! Exported records carry normalized tag values instead of tag IDs so a
//! dump can be re-imported into a store with different tag identities.
//! Timestamps serialize as ISO-8601 via chrono's serde support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single record in portable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordExport {
    pub id: Uuid,
    pub content: String,
    /// Normalized tag values (no raw tag identifiers leak into exports).
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A full export payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    /// Payload format version.
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub records: Vec<RecordExport>,
}

impl ExportEnvelope {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(records: Vec<RecordExport>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            exported_at: Utc::now(),
            records,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Records written to the store.
    pub imported: usize,
    /// Records skipped because their ID already existed.
    pub skipped: usize,
    /// Tags created as a side effect.
    pub created_tags: usize,
}
