//! cryptorank-rs: async client for a crypto rankings backend.
//!
//! Two data paths share one transport ([`RankClient`]):
//!
//! - **Jobs.** [`PollController`] triggers a background ranking job, polls its result on a
//!   fixed interval, and falls back to synthesized placeholder rows ([`synth`]) when the job
//!   does not resolve within its attempt or transport-error budget.
//! - **Snapshot.** [`Dashboard`] reads the backend's aggregated multi-metric snapshot
//!   through a stale-while-revalidate [`QueryCache`], refreshes it periodically, and
//!   exposes a manual collection trigger.
//!
//! ```no_run
//! use cryptorank_rs::{Criterion, PollController, RankClient, RankingRequest};
//!
//! # async fn demo() -> Result<(), cryptorank_rs::RankError> {
//! let client = RankClient::builder().build()?;
//! let controller = PollController::new(client);
//! let outcome = controller
//!     .run(RankingRequest::new(Criterion::MarketCap, 10)?)
//!     .await?;
//! for row in outcome.records().unwrap_or_default() {
//!     println!("{} ({}) {}", row.display_name, row.symbol, row.formatted_value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod core;
pub mod dashboard;
pub mod format;
pub mod jobs;
pub mod snapshot;
pub mod synth;

pub use cache::{CachePolicy, CacheRead, Freshness, QueryCache, QueryState, RefreshHandle};
pub use crate::core::{
    Backoff, Criterion, JobHandle, JobPoll, Priority, RankClient, RankClientBuilder, RankError,
    RankedRecord, RankingRequest, RankingService, RetryConfig, SnapshotService, ValueFormat,
};
pub use dashboard::Dashboard;
pub use jobs::{ExhaustReason, Outcome, PollConfig, PollController, PollState};
pub use snapshot::{AggregateStats, HealthStatus, MetricInfo, MetricResult, Snapshot};

#[cfg(feature = "tracing-subscriber")]
pub use crate::core::logging::init_tracing;
