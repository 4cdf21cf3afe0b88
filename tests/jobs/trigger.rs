use httpmock::Method::GET;

use crate::common::{client_for, setup_server};
use cryptorank_rs::{Criterion, PollController, PollState, RankError, RankingRequest};

#[tokio::test]
async fn trigger_builds_path_and_reads_job_id() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/list/cryptocurrencies/market_cap/10")
            .query_param("key", "demo");
        then.status(200).header("content-type", "application/json").body(
            r#"{"event_id":"evt-1","sort":"market_cap","limit":10,"message":"Event published"}"#,
        );
    });

    let client = client_for(&server);
    let req = RankingRequest::new(Criterion::MarketCap, 10).unwrap();
    let handle = client.trigger(&req).await.unwrap();

    mock.assert();
    assert_eq!(handle.id(), "evt-1");
    assert_eq!(handle.request(), &req);
}

#[tokio::test]
async fn custom_api_key_is_sent() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/list/cryptocurrencies/alt_rank/5")
            .query_param("key", "secret");
        then.status(200).body(r#"{"jobId":"j-9"}"#);
    });

    let client = cryptorank_rs::RankClient::builder()
        .base_url(url::Url::parse(&server.base_url()).unwrap())
        .api_key("secret")
        .build()
        .unwrap();
    let handle = client
        .trigger(&RankingRequest::new(Criterion::AltRank, 5).unwrap())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(handle.id(), "j-9");
}

#[tokio::test]
async fn mismatched_echo_keeps_the_requested_parameters() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/galaxy_score/7");
        then.status(200)
            .body(r#"{"event_id":"evt-7","sort":"market_cap","limit":3}"#);
    });

    let client = client_for(&server);
    let req = RankingRequest::new(Criterion::GalaxyScore, 7).unwrap();
    let handle = client.trigger(&req).await.unwrap();

    mock.assert();
    assert_eq!(handle.id(), "evt-7");
    assert_eq!(handle.request().criterion(), &Criterion::GalaxyScore);
    assert_eq!(handle.request().result_count(), 7);
}

#[tokio::test]
async fn non_success_status_is_a_trigger_error() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/price/3");
        then.status(500).body(r#"{"error":"Failed to publish event"}"#);
    });

    let client = client_for(&server);
    let err = client
        .trigger(&RankingRequest::new(Criterion::Price, 3).unwrap())
        .await
        .unwrap_err();
    match err {
        RankError::Trigger(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("expected Trigger, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_job_id_is_a_trigger_error() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/price/3");
        then.status(200).body(r#"{"message":"Event published"}"#);
    });

    let client = client_for(&server);
    let err = client
        .trigger(&RankingRequest::new(Criterion::Price, 3).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RankError::Trigger(_)), "{err:?}");
}

#[tokio::test]
async fn controller_reports_failed_trigger_in_state() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/volume_24h/10");
        then.status(503);
    });

    let controller = PollController::new(client_for(&server));
    let result = controller
        .run(RankingRequest::new(Criterion::Volume24h, 10).unwrap())
        .await;

    assert!(matches!(result, Err(RankError::Trigger(_))));
    assert!(matches!(controller.state(), PollState::TriggerFailed { .. }));
    assert!(controller.state().is_terminal());
}

#[test]
fn out_of_range_counts_are_rejected_before_any_request() {
    for n in [0, 101] {
        let err = RankingRequest::new(Criterion::MarketCap, n).unwrap_err();
        assert!(matches!(err, RankError::InvalidRequest(_)), "{n}: {err:?}");
    }
}
