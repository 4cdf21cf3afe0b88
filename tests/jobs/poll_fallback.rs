use httpmock::Method::GET;
use std::sync::Arc;

use crate::common::{client_for, fast_poll, setup_server};
use cryptorank_rs::{
    Criterion, ExhaustReason, Outcome, PollController, PollState, RankingRequest, synth,
};

#[tokio::test]
async fn never_ready_job_falls_back_after_attempt_budget() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/market_cap/10");
        then.status(200).body(r#"{"event_id":"evt-1"}"#);
    });
    let results = server.mock(|when, then| {
        when.method(GET).path("/results/evt-1");
        then.status(200).body(r#"{"status":"processing"}"#);
    });

    let controller = PollController::with_config(Arc::new(client_for(&server)), fast_poll(4, 5));
    let outcome = controller
        .run(RankingRequest::new(Criterion::MarketCap, 10).unwrap())
        .await
        .unwrap();

    results.assert_hits(4);
    let Outcome::Fallback { records, reason } = outcome else {
        panic!("expected fallback, got {outcome:?}");
    };
    assert_eq!(reason, ExhaustReason::NotReady);
    assert_eq!(records.len(), synth::REFERENCE_POOL.len());
    assert!(records.iter().all(|r| r.formatted_value.starts_with('$')));
    assert!(matches!(
        controller.state(),
        PollState::FallbackShown { attempts: 4, .. }
    ));
}

#[tokio::test]
async fn failing_results_endpoint_exhausts_error_budget_first() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/sentiment/3");
        then.status(200).body(r#"{"event_id":"evt-2"}"#);
    });
    let results = server.mock(|when, then| {
        when.method(GET).path("/results/evt-2");
        then.status(502).body("bad gateway");
    });

    let controller = PollController::with_config(Arc::new(client_for(&server)), fast_poll(15, 5));
    let outcome = controller
        .run(RankingRequest::new(Criterion::Sentiment, 3).unwrap())
        .await
        .unwrap();

    results.assert_hits(5);
    match outcome {
        Outcome::Fallback { records, reason } => {
            assert_eq!(reason, ExhaustReason::TransportErrors);
            assert_eq!(records.len(), 3);
            assert!(records.iter().all(|r| r.formatted_value.ends_with('%')));
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_counts_as_transport_error() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/price/2");
        then.status(200).body(r#"{"event_id":"evt-3"}"#);
    });
    let results = server.mock(|when, then| {
        when.method(GET).path("/results/evt-3");
        then.status(200).body("<html>oops</html>");
    });

    let controller = PollController::with_config(Arc::new(client_for(&server)), fast_poll(15, 2));
    let outcome = controller
        .run(RankingRequest::new(Criterion::Price, 2).unwrap())
        .await
        .unwrap();

    results.assert_hits(2);
    assert!(matches!(
        outcome,
        Outcome::Fallback {
            reason: ExhaustReason::TransportErrors,
            ..
        }
    ));
}
