//! Export / import round-trip tests.

mod helpers;

use helpers::Harness;
use tagnote_core::CreateRecordRequest;

fn create(content: &str) -> CreateRecordRequest {
    CreateRecordRequest {
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_export_import_round_trip_preserves_everything() {
    let source = Harness::new();
    source.create.execute(create("rust tokio async")).await.unwrap();
    source.create.execute(create("python django")).await.unwrap();

    let envelope = source.export.execute().await.unwrap();
    assert_eq!(envelope.records.len(), 2);

    let target = Harness::new();
    let summary = target.import.execute(&envelope).await.unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.created_tags, 5);

    // Re-exporting the target yields the same payload: same IDs, content,
    // tag membership by normalized value, and exact timestamps.
    let round_tripped = target.export.execute().await.unwrap();
    assert_eq!(round_tripped.records, envelope.records);
}

#[tokio::test]
async fn test_export_uses_normalized_values_not_ids() {
    let h = Harness::new();
    h.create.execute(create("Café RUST")).await.unwrap();

    let envelope = h.export.execute().await.unwrap();

    assert_eq!(envelope.records.len(), 1);
    assert_eq!(envelope.records[0].tags, vec!["cafe", "rust"]);
}

#[tokio::test]
async fn test_import_skips_records_that_already_exist() {
    let h = Harness::new();
    h.create.execute(create("rust tokio")).await.unwrap();

    let envelope = h.export.execute().await.unwrap();
    let summary = h.import.execute(&envelope).await.unwrap();

    assert_eq!(summary.imported, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(h.store.record_count(), 1);
}

#[tokio::test]
async fn test_import_reuses_existing_tags_by_value() {
    let source = Harness::new();
    source.create.execute(create("rust tokio")).await.unwrap();
    let envelope = source.export.execute().await.unwrap();

    let target = Harness::new();
    target.create.execute(create("rust")).await.unwrap();

    let summary = target.import.execute(&envelope).await.unwrap();

    // "rust" resolved to the pre-existing tag; only "tokio" was minted.
    assert_eq!(summary.created_tags, 1);
    assert_eq!(target.store.tag_values(), vec!["rust", "tokio"]);
}

#[tokio::test]
async fn test_import_commit_failure_writes_nothing() {
    let source = Harness::new();
    source.create.execute(create("rust tokio")).await.unwrap();
    let envelope = source.export.execute().await.unwrap();

    let target = Harness::new();
    target.store.set_fail_commit(true);

    let err = target.import.execute(&envelope).await.unwrap_err();

    assert!(err.to_string().contains("commit failed"));
    assert_eq!(target.store.rollback_count(), 1);
    assert_eq!(target.store.record_count(), 0);
    assert_eq!(target.store.tag_count(), 0);
}

#[tokio::test]
async fn test_import_rejects_newer_payload_version() {
    let h = Harness::new();
    let mut envelope = tagnote_core::ExportEnvelope::new(Vec::new());
    envelope.version = tagnote_core::ExportEnvelope::CURRENT_VERSION + 1;

    let err = h.import.execute(&envelope).await.unwrap_err();

    assert_eq!(err.code(), "USE_CASE_ERROR");
    assert_eq!(h.store.begin_count(), 0);
}

#[tokio::test]
async fn test_envelope_survives_json_serialization() {
    let h = Harness::new();
    h.create.execute(create("rust tokio")).await.unwrap();

    let envelope = h.export.execute().await.unwrap();
    let json = serde_json::to_string(&envelope).unwrap();
    let parsed: tagnote_core::ExportEnvelope = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.records, envelope.records);
    assert_eq!(parsed.version, envelope.version);
}
