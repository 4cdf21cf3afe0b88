#![allow(dead_code)]

use cryptorank_rs::{PollConfig, RankClient};
use httpmock::MockServer;
use std::{fs, path::Path, time::Duration};
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn client_for(server: &MockServer) -> RankClient {
    RankClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Same budgets as production, on a millisecond clock.
pub fn fast_poll(max_attempts: u32, max_transport_errors: u32) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(5),
        max_attempts,
        max_transport_errors,
    }
}

pub fn result_body(rows: &[(&str, &str, &str)], sort: &str) -> String {
    let data: Vec<_> = rows
        .iter()
        .map(|(name, symbol, value)| {
            serde_json::json!({"name": name, "symbol": symbol, "value": value, "sort": sort})
        })
        .collect();
    serde_json::json!({ "data": data }).to_string()
}
