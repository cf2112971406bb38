//! Create-record use case tests.

mod helpers;

use helpers::Harness;
use tagnote_core::{CreateRecordRequest, Error};

fn request(content: &str) -> CreateRecordRequest {
    CreateRecordRequest {
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_create_persists_record_and_tags() {
    let h = Harness::new();

    let response = h.create.execute(request("rust tokio async")).await.unwrap();

    assert_eq!(response.record.tag_count(), 3);
    assert_eq!(response.created_tags.len(), 3);
    assert_eq!(h.store.record_count(), 1);
    assert_eq!(h.store.tag_values(), vec!["async", "rust", "tokio"]);
    assert_eq!(h.store.commit_count(), 1);
    assert_eq!(h.store.rollback_count(), 0);
}

#[tokio::test]
async fn test_create_reuses_existing_tags() {
    let h = Harness::new();

    h.create.execute(request("rust tokio")).await.unwrap();
    let response = h.create.execute(request("rust serde")).await.unwrap();

    // "rust" resolved to the stored tag; only "serde" is new.
    assert_eq!(response.created_tags.len(), 1);
    assert_eq!(response.created_tags[0].normalized_value(), "serde");
    assert_eq!(h.store.tag_values(), vec!["rust", "serde", "tokio"]);
}

#[tokio::test]
async fn test_create_normalizes_tags_from_content() {
    let h = Harness::new();

    let response = h.create.execute(request("Café RUST rust")).await.unwrap();

    assert_eq!(response.record.tag_count(), 2);
    assert_eq!(h.store.tag_values(), vec!["cafe", "rust"]);
}

#[tokio::test]
async fn test_create_empty_content_is_validation_error() {
    let h = Harness::new();

    let err = h.create.execute(request("   ")).await.unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(h.store.begin_count(), 0);
    assert_eq!(h.store.record_count(), 0);
}

#[tokio::test]
async fn test_create_duplicate_tag_set_rejected_before_transaction() {
    let h = Harness::new();

    let first = h.create.execute(request("rust tokio")).await.unwrap();
    // Different content and token order, identical tag set.
    let err = h.create.execute(request("tokio RUST")).await.unwrap_err();

    match err {
        Error::DuplicateRecord(existing) => assert_eq!(existing, first.record.id()),
        other => panic!("expected DuplicateRecord, got {other:?}"),
    }
    // Rejected before the transaction opened: only the first create began one.
    assert_eq!(h.store.begin_count(), 1);
    assert_eq!(h.store.record_count(), 1);
}

#[tokio::test]
async fn test_create_records_with_empty_tag_sets_are_duplicates() {
    let h = Harness::new();

    // Every token is invalid, so both records parse to an empty tag set.
    h.create.execute(request("a,b c{d}")).await.unwrap();
    let err = h.create.execute(request("x[y] \"z\"")).await.unwrap_err();

    assert_eq!(err.code(), "DUPLICATE_RECORD");
    assert_eq!(h.store.record_count(), 1);
    assert_eq!(h.store.tag_count(), 0);
}

#[tokio::test]
async fn test_create_commit_failure_rolls_back_and_surfaces_commit_error() {
    let h = Harness::new();
    h.store.set_fail_commit(true);

    let err = h.create.execute(request("rust tokio")).await.unwrap_err();

    // The surfaced error is the commit error, rollback was attempted, and
    // no partial state survived.
    assert!(err.to_string().contains("commit failed"));
    assert_eq!(h.store.rollback_count(), 1);
    assert_eq!(h.store.commit_count(), 0);
    assert_eq!(h.store.record_count(), 0);
    assert_eq!(h.store.tag_count(), 0);
}

#[tokio::test]
async fn test_create_save_failure_rolls_back_and_propagates() {
    let h = Harness::new();
    h.store.set_fail_save_record(true);

    let err = h.create.execute(request("rust")).await.unwrap_err();

    assert!(err.to_string().contains("save_record failed"));
    assert_eq!(h.store.rollback_count(), 1);
    assert_eq!(h.store.record_count(), 0);
    assert_eq!(h.store.tag_count(), 0);
}

#[tokio::test]
async fn test_create_begin_failure_leaves_store_untouched() {
    let h = Harness::new();
    h.store.set_fail_begin(true);

    let err = h.create.execute(request("rust")).await.unwrap_err();

    assert_eq!(err.code(), "TRANSACTION_ERROR");
    assert_eq!(h.store.record_count(), 0);
    assert_eq!(h.store.rollback_count(), 0);
}
