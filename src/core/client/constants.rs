//! Centralized constants for default endpoints and UA.

/// Default UA sent with every request.
pub(crate) const USER_AGENT: &str = concat!("cryptorank-rs/", env!("CARGO_PKG_VERSION"));

/// Backend base used when neither the builder nor the environment provides one.
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Environment variable consulted by `RankClientBuilder::from_env`.
pub(crate) const BASE_URL_ENV: &str = "CRYPTORANK_API_URL";

/// Key sent as `?key=` on trigger requests when none is configured.
pub(crate) const DEFAULT_API_KEY: &str = "demo";

/// Job trigger path; criterion and limit are appended as segments.
pub(crate) const TRIGGER_PATH: &str = "list/cryptocurrencies";

/// Job result path; the job id is appended as a segment.
pub(crate) const RESULTS_PATH: &str = "results";

/// Aggregated multi-metric snapshot.
pub(crate) const SNAPSHOT_PATH: &str = "api/crypto/data";

/// Metric catalog.
pub(crate) const INFO_PATH: &str = "api/crypto/info";

/// Fire-and-forget background collection trigger.
pub(crate) const MANUAL_TRIGGER_PATH: &str = "dev/trigger";

pub(crate) const HEALTH_PATH: &str = "health";
