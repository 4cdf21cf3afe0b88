//! Steady-state dashboard data: the aggregated snapshot, the metric catalog, and health.

pub(crate) mod api;
mod model;
mod wire;

pub use crate::core::Priority;
pub use model::{AggregateStats, HealthStatus, MetricInfo, MetricResult, Snapshot};

use crate::core::{RankClient, RankError};

impl RankClient {
    /// Reads the latest aggregated snapshot.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`] while the backend has not collected anything yet; otherwise
    /// any transport or decoding failure.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn snapshot(&self) -> Result<Snapshot, RankError> {
        api::fetch_snapshot(self).await
    }

    /// Asks the backend to start a collection run now. Fire-and-forget: only the status
    /// is checked, the new data shows up in a later [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn request_refresh(&self) -> Result<(), RankError> {
        api::request_refresh(self).await
    }

    /// The metrics the backend collects, high priority first.
    ///
    /// # Errors
    ///
    /// Transport or decoding failures.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn metric_catalog(&self) -> Result<Vec<MetricInfo>, RankError> {
        api::fetch_metric_catalog(self).await
    }

    /// Backend liveness.
    ///
    /// # Errors
    ///
    /// Transport or decoding failures.
    pub async fn health(&self) -> Result<HealthStatus, RankError> {
        api::fetch_health(self).await
    }
}
