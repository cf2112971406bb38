//! Search use case tests.

mod helpers;

use helpers::Harness;
use tagnote_core::CreateRecordRequest;

fn create(content: &str) -> CreateRecordRequest {
    CreateRecordRequest {
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_tag_search_requires_every_term() {
    let h = Harness::new();
    let js = h.create.execute(create("javascript react")).await.unwrap();
    h.create.execute(create("python django")).await.unwrap();

    let none = h.search.by_tags("javascript python").await.unwrap();
    assert!(none.is_empty());

    let hits = h.search.by_tags("javascript react").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), js.record.id());
}

#[tokio::test]
async fn test_tag_search_empty_query_matches_all() {
    let h = Harness::new();
    h.create.execute(create("javascript react")).await.unwrap();
    h.create.execute(create("python django")).await.unwrap();

    let hits = h.search.by_tags("").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_tag_search_matches_substrings() {
    let h = Harness::new();
    h.create.execute(create("javascript typescript")).await.unwrap();

    let hits = h.search.by_tags("script").await.unwrap();
    assert_eq!(hits.len(), 1);

    let hits = h.search.by_tags("java").await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_tag_search_normalizes_query_terms() {
    let h = Harness::new();
    h.create.execute(create("café notes")).await.unwrap();

    let hits = h.search.by_tags("CAFÉ").await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_content_search_scans_record_bodies() {
    let h = Harness::new();
    h.create.execute(create("meeting agenda standup")).await.unwrap();
    h.create.execute(create("grocery list")).await.unwrap();

    let hits = h.search.by_content("agenda").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].content().as_str().contains("agenda"));

    let none = h.search.by_content("nonexistent").await.unwrap();
    assert!(none.is_empty());
}
