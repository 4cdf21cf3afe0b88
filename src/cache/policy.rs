use std::time::Duration;

use crate::core::client::RetryConfig;

/// Staleness, retry, and auto-refresh settings for a [`QueryCache`](super::QueryCache).
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    /// How long a fetched value is served without any network call.
    pub stale_time: Duration,
    /// Retry budget for a fetch (blocking or background).
    pub retry: RetryConfig,
    /// Period of the auto-refresh loop started by `auto_refresh`. `None` disables it.
    pub refetch_interval: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            retry: RetryConfig::default(),
            refetch_interval: Some(Duration::from_secs(5 * 60)),
        }
    }
}
