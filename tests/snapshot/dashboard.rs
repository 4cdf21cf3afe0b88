use httpmock::Method::{GET, POST};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{client_for, fixture, setup_server};
use cryptorank_rs::{
    Backoff, CachePolicy, Criterion, Dashboard, Freshness, RankError, RetryConfig,
};

fn quick_policy() -> CachePolicy {
    CachePolicy {
        retry: RetryConfig {
            enabled: true,
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_millis(1)),
        },
        ..CachePolicy::default()
    }
}

#[tokio::test]
async fn mount_fetches_once_then_serves_fresh() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(200).body(fixture("snapshot.json"));
    });

    let dash = Dashboard::with_policy(Arc::new(client_for(&server)), quick_policy());
    let first = dash.mount().await.unwrap();
    assert_eq!(first.freshness, Freshness::Fetched);
    assert!(first.value.get(&Criterion::MarketCap).is_some());

    let second = dash.read().await.unwrap();
    assert_eq!(second.freshness, Freshness::Fresh);
    mock.assert_hits(1);
}

#[tokio::test]
async fn exhausted_retries_surface_error_state() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(404).body(r#"{"error":"No crypto data available yet"}"#);
    });

    let dash = Dashboard::with_policy(Arc::new(client_for(&server)), quick_policy());
    let err = dash.read().await.unwrap_err();

    mock.assert_hits(3);
    assert!(matches!(err, RankError::CacheFetch { attempts: 3, .. }), "{err:?}");
    let state = dash.state();
    assert!(state.entry.is_none());
    assert!(!state.is_fetching);
    assert!(state.error.unwrap().contains("No crypto data available yet"));
}

#[tokio::test]
async fn manual_fetch_posts_then_rereads() {
    let server = setup_server();
    let data = server.mock(|when, then| {
        when.method(GET).path("/api/crypto/data");
        then.status(200).body(fixture("snapshot.json"));
    });
    let trigger = server.mock(|when, then| {
        when.method(POST).path("/dev/trigger");
        then.status(200);
    });

    let dash = Dashboard::with_policy(Arc::new(client_for(&server)), quick_policy())
        .manual_reread_delay(Duration::from_millis(50));
    dash.read().await.unwrap();
    dash.trigger_manual_fetch().await.unwrap();
    trigger.assert();

    tokio::time::sleep(Duration::from_millis(300)).await;
    data.assert_hits(2);
}
