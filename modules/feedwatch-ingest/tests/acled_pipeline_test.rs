//! ACLED: paged JSON, deduplicated on `data_id` across pages and against the
//! store.

mod harness;

use feedwatch_common::{Config, FeedError, SeenKeys};
use feedwatch_ingest::feeds::acled;
use feedwatch_ingest::testing::MockFetcher;
use feedwatch_ingest::{ingest_acled, MemoryStore, RecordStore, Source};
use harness::*;
use serde_json::{json, Value};

const TIMBUKTU: (f64, f64) = (16.7735, -3.0074);

fn paged_fetcher() -> MockFetcher {
    MockFetcher::new()
        .on(
            &acled_page_url(1),
            acled_page(&[
                acled_event("101", "2020-01-12", AISNE),
                acled_event("102", "2020-01-13", TIMBUKTU),
                acled_event("102", "2020-01-13", TIMBUKTU),
            ]),
        )
        .on(
            &acled_page_url(2),
            acled_page(&[
                // repeated from page 1
                acled_event("102", "2020-01-13", TIMBUKTU),
                acled_event("103", "12 January 2020", TIMBUKTU),
            ]),
        )
        .on(&acled_page_url(3), acled_page(&[]))
}

#[tokio::test]
async fn single_page_is_annotated() {
    let records = acled::page_pipeline(&config(), 1)
        .run(&paged_fetcher(), &SeenKeys::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    let event = find(&records, "data_id", "101");
    assert_eq!(event.get_str("event_date"), Some("2020-01-12"));
    assert_eq!(event.get_str("location_id"), Some("u0fe1q81v"));
    assert_eq!(event.get_str("ally_actor_1"), Some(""));
    assert_eq!(
        event.get_str("ally_actor_2"),
        Some("Fulani Ethnic Group (Mali)")
    );
    // originals stay alongside the copies
    assert!(event.contains("assoc_actor_2"));
    assert_eq!(event.get("gwno"), Some(&Value::Null));
    assert!(uuid::Uuid::parse_str(event.get_str("uuid_acled").unwrap()).is_ok());
}

#[tokio::test]
async fn pages_until_nothing_new() {
    let fetcher = paged_fetcher();
    let store = MemoryStore::new();

    let summary = ingest_acled(&config(), &fetcher, &store).await.unwrap();

    assert_eq!(summary.source, Source::Acled);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.inserted, 3);
    assert_eq!(
        fetcher.requests(),
        vec![acled_page_url(1), acled_page_url(2), acled_page_url(3)]
    );

    let stored = store.records();
    let ids: Vec<_> = stored.iter().filter_map(|r| r.get_str("data_id")).collect();
    assert_eq!(ids, vec!["101", "102", "103"]);
    assert_eq!(find(&stored, "data_id", "103").get_str("event_date"), Some("2020-01-12"));
}

#[tokio::test]
async fn stops_at_first_page_already_stored() {
    let fetcher = paged_fetcher();
    let store = MemoryStore::with_records(vec![
        record(json!({"data_id": "101"})),
        record(json!({"data_id": "102"})),
    ]);

    let summary = ingest_acled(&config(), &fetcher, &store).await.unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.inserted, 0);
    assert_eq!(fetcher.requests(), vec![acled_page_url(1)]);
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn page_cap_is_respected() {
    let fetcher = paged_fetcher();
    let store = MemoryStore::new();
    let config = Config {
        acled_max_pages: 1,
        ..config()
    };

    let summary = ingest_acled(&config, &fetcher, &store).await.unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.inserted, 2);
    assert_eq!(fetcher.requests(), vec![acled_page_url(1)]);
}

#[tokio::test]
async fn credentials_are_sent_with_each_page() {
    let config = Config {
        acled_key: Some("secret".into()),
        acled_email: Some("ops@example.org".into()),
        ..config()
    };
    let url = format!("{}&key=secret&email=ops@example.org", acled_page_url(1));
    let fetcher = MockFetcher::new().on(&url, acled_page(&[]));

    let summary = ingest_acled(&config, &fetcher, &MemoryStore::new()).await.unwrap();

    assert_eq!(summary.inserted, 0);
    assert_eq!(fetcher.requests(), vec![url]);
}

#[tokio::test]
async fn error_payload_is_parse_error() {
    let fetcher = MockFetcher::new().on(
        &acled_page_url(1),
        r#"{"status": 403, "success": false, "error": {"message": "Access denied"}}"#,
    );
    let store = MemoryStore::new();

    let err = ingest_acled(&config(), &fetcher, &store).await.unwrap_err();

    match err {
        FeedError::Parse { origin, snippet, .. } => {
            assert_eq!(origin, acled_page_url(1));
            assert!(snippet.contains("Access denied"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(store.existing_keys(&acled::identity_key()).await.unwrap().is_empty());
}

#[tokio::test]
async fn failure_on_later_page_persists_nothing() {
    let fetcher = MockFetcher::new()
        .on(&acled_page_url(1), acled_page(&[acled_event("101", "2020-01-12", AISNE)]))
        .failing(&acled_page_url(2), 502);
    let store = MemoryStore::new();

    let err = ingest_acled(&config(), &fetcher, &store).await.unwrap_err();

    assert!(matches!(err, FeedError::Fetch { status: Some(502), .. }));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn unparseable_event_date_aborts() {
    let fetcher = MockFetcher::new().on(
        &acled_page_url(1),
        acled_page(&[acled_event("101", "sometime in spring", AISNE)]),
    );
    let err = acled::page_pipeline(&config(), 1)
        .run(&fetcher, &SeenKeys::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::DateParse { ref field, .. } if field == "event_date"));
}
