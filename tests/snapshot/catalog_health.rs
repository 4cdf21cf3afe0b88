use httpmock::Method::{GET, POST};

use crate::common::{client_for, fixture, setup_server};
use cryptorank_rs::{Criterion, Priority, RankError};

#[tokio::test]
async fn catalog_is_sorted_high_to_low() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/crypto/info");
        then.status(200).body(fixture("info.json"));
    });

    let catalog = client_for(&server).metric_catalog().await.unwrap();
    let keys: Vec<_> = catalog.iter().map(|m| m.criterion.clone()).collect();
    assert_eq!(
        keys,
        [
            Criterion::MarketCap,
            Criterion::Price,
            Criterion::SocialDominance,
            Criterion::CirculatingSupply,
        ]
    );
    assert_eq!(catalog[1].description, "Current USD Price");
    assert_eq!(catalog[3].priority, Priority::Low);
}

#[tokio::test]
async fn health_reports_store_connection() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body(r#"{"status":"healthy","redis":true}"#);
    });

    let health = client_for(&server).health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.store_connected, Some(true));
}

#[tokio::test]
async fn manual_refresh_posts_and_checks_status() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/dev/trigger");
        then.status(200).body(r#"{"status":"triggered"}"#);
    });

    client_for(&server).request_refresh().await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn rejected_manual_refresh_is_an_error() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(POST).path("/dev/trigger");
        then.status(403);
    });

    let err = client_for(&server).request_refresh().await.unwrap_err();
    assert!(matches!(err, RankError::Status { status: 403, .. }), "{err:?}");
}
