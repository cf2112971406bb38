//! Shared harness for use-case tests.

#![allow(dead_code)]

use tagnote_app::memory::InMemoryStore;
use tagnote_app::{
    CreateRecordUseCase, DeleteRecordUseCase, ExportRecordsUseCase, ImportRecordsUseCase,
    SearchRecordsUseCase, UpdateRecordUseCase,
};

/// All use cases wired against one shared in-memory store.
pub struct Harness {
    pub store: InMemoryStore,
    pub create: CreateRecordUseCase,
    pub update: UpdateRecordUseCase,
    pub delete: DeleteRecordUseCase,
    pub search: SearchRecordsUseCase,
    pub export: ExportRecordsUseCase,
    pub import: ImportRecordsUseCase,
}

impl Harness {
    pub fn new() -> Self {
        // One subscriber for the whole test binary; later calls are no-ops.
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init()
            .ok();

        let store = InMemoryStore::new();
        let records = store.record_repository();
        let tags = store.tag_repository();
        let provider = store.provider();
        Self {
            create: CreateRecordUseCase::new(records.clone(), tags.clone(), provider.clone()),
            update: UpdateRecordUseCase::new(records.clone(), tags.clone(), provider.clone()),
            delete: DeleteRecordUseCase::new(records.clone(), provider.clone()),
            search: SearchRecordsUseCase::new(records.clone(), tags.clone()),
            export: ExportRecordsUseCase::new(records.clone(), tags.clone()),
            import: ImportRecordsUseCase::new(records, tags, provider),
            store,
        }
    }
}
