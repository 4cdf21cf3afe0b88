use httpmock::Method::GET;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{client_for, fast_poll, result_body, setup_server};
use cryptorank_rs::{Criterion, Outcome, PollController, PollState, RankingRequest};

#[tokio::test]
async fn ready_result_is_decoded() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/galaxy_score/2");
        then.status(200).body(r#"{"event_id":"evt-7"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/results/evt-7");
        then.status(200).body(r#"{"data":[
            {"name":"Solana (SOL)","value":"71.2","sort":"galaxy_score"},
            {"name":"Chainlink","symbol":"LINK","value":"68.9","sort":"galaxy_score"}
        ]}"#);
    });

    let controller = PollController::with_config(Arc::new(client_for(&server)), fast_poll(15, 5));
    let outcome = controller
        .run(RankingRequest::new(Criterion::GalaxyScore, 2).unwrap())
        .await
        .unwrap();

    let Outcome::Succeeded(records) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_name, "Solana");
    assert_eq!(records[0].symbol, "SOL");
    assert_eq!(records[1].symbol, "LINK");
    assert!(records.iter().all(|r| r.criterion == Criterion::GalaxyScore));
    assert!(matches!(controller.state(), PollState::Succeeded { attempts: 1, .. }));
}

#[tokio::test]
async fn job_that_becomes_ready_mid_loop_succeeds() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/market_cap/3");
        then.status(200).body(r#"{"event_id":"evt-8"}"#);
    });
    let mut pending = server.mock(|when, then| {
        when.method(GET).path("/results/evt-8");
        then.status(200).body(r#"{"data":[]}"#);
    });

    let mut config = fast_poll(15, 5);
    config.interval = Duration::from_millis(50);
    let controller = PollController::with_config(Arc::new(client_for(&server)), config);
    let mut states = controller.subscribe();
    let task = controller.spawn(RankingRequest::new(Criterion::MarketCap, 3).unwrap());

    states
        .wait_for(|s| matches!(s, PollState::Polling { attempt, .. } if *attempt >= 2))
        .await
        .unwrap();
    pending.delete_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/results/evt-8");
        then.status(200).body(result_body(
            &[
                ("Bitcoin", "BTC", "$1,000"),
                ("Ethereum", "ETH", "$500"),
                ("Tether", "USDT", "$100"),
            ],
            "market_cap",
        ));
    });

    let outcome = task.await.unwrap().unwrap();
    let records = outcome.records().unwrap();
    assert!(!outcome.is_fallback());
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].formatted_value, "$1,000");
    match controller.state() {
        PollState::Succeeded { attempts, .. } => assert!((2..=4).contains(&attempts), "{attempts}"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn new_trigger_supersedes_running_loop() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/price/5");
        then.status(200).body(r#"{"event_id":"old"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/list/cryptocurrencies/alt_rank/5");
        then.status(200).body(r#"{"event_id":"new"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/results/old");
        then.status(200).body("{}");
    });
    server.mock(|when, then| {
        when.method(GET).path("/results/new");
        then.status(200)
            .body(result_body(&[("Solana", "SOL", "1")], "alt_rank"));
    });

    let controller = PollController::with_config(Arc::new(client_for(&server)), fast_poll(200, 5));
    let first = controller.spawn(RankingRequest::new(Criterion::Price, 5).unwrap());
    let mut states = controller.subscribe();
    states
        .wait_for(|s| matches!(s, PollState::Polling { .. }))
        .await
        .unwrap();

    let second = controller
        .run(RankingRequest::new(Criterion::AltRank, 5).unwrap())
        .await
        .unwrap();

    assert_eq!(first.await.unwrap().unwrap(), Outcome::Cancelled);
    let records = second.records().unwrap();
    assert_eq!(records[0].symbol, "SOL");
    assert!(matches!(controller.state(), PollState::Succeeded { .. }));
}
