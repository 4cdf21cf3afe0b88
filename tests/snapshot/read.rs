use httpmock::Method::GET;

use crate::common::{client_for, fixture, setup_server};
use cryptorank_rs::{Criterion, Priority, RankError};

#[tokio::test]
async fn snapshot_decodes_fixture() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("snapshot.json"));
    });

    let snap = client_for(&server).snapshot().await.unwrap();
    mock.assert();

    assert_eq!(snap.total_metrics(), 4);
    assert_eq!(snap.stats.success_count, 3);
    assert_eq!(snap.stats.failure_count, 1);
    assert_eq!(snap.stats.total_duration_ms, 6570);

    let mc = snap.get(&Criterion::MarketCap).unwrap();
    assert_eq!(mc.records.len(), 3);
    assert_eq!(mc.preview(1)[0].symbol, "BTC");
    assert_eq!(mc.fetch_duration_ms, 812);

    let alt = snap.get(&Criterion::AltRank).unwrap();
    assert_eq!(alt.records[1].display_name, "Chainlink");
    assert_eq!(alt.records[1].symbol, "LINK");

    let failed = snap.get(&Criterion::Interactions).unwrap();
    assert!(!failed.success);
    assert!(failed.records.is_empty());
    assert_eq!(failed.error_message.as_deref(), Some("upstream timeout"));

    let priorities: Vec<_> = snap
        .metrics_by_priority()
        .into_iter()
        .map(|(_, m)| m.priority)
        .collect();
    assert_eq!(
        priorities,
        [Priority::High, Priority::High, Priority::Medium, Priority::Low]
    );
}

#[tokio::test]
async fn missing_data_maps_to_not_found_with_server_message() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(404).body(
            r#"{"error":"No crypto data available yet","message":"Data will be available after the first fetch cycle completes"}"#,
        );
    });

    let err = client_for(&server).snapshot().await.unwrap_err();
    match err {
        RankError::NotFound { message, url } => {
            assert!(message.starts_with("No crypto data available yet"), "{message}");
            assert!(url.ends_with("/api/crypto/data"), "{url}");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(500).body(r#"{"error":"Failed to parse data"}"#);
    });

    let err = client_for(&server).snapshot().await.unwrap_err();
    assert!(matches!(err, RankError::Status { status: 500, .. }), "{err:?}");
}
