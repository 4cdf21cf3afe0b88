use futures::future::BoxFuture;

use crate::core::{JobHandle, RankError, RankedRecord, RankingRequest};
use crate::snapshot::Snapshot;

/// Boxed future returned by the service traits.
pub type ServiceFuture<'a, T> = BoxFuture<'a, Result<T, RankError>>;

/// What one look at a job's result endpoint produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPoll {
    /// The job has not produced a populated result yet.
    Pending,
    /// The job finished with these records (never empty).
    Ready(Vec<RankedRecord>),
}

/// Transport for the asynchronous job path.
///
/// Implemented by [`crate::RankClient`]. The poll controller only depends on this trait,
/// so it can be driven by a scripted fake in tests.
pub trait RankingService: Send + Sync {
    /// Starts a background ranking job and returns its handle.
    ///
    /// # Errors
    ///
    /// Fails with [`RankError::Trigger`] when the backend rejects the request or the
    /// response lacks a job id.
    fn trigger_job<'a>(&'a self, request: &'a RankingRequest) -> ServiceFuture<'a, JobHandle>;

    /// Looks once at the job's result.
    ///
    /// # Errors
    ///
    /// Any transport-level failure (network error, non-2xx, undecodable body).
    fn fetch_job_result<'a>(&'a self, job: &'a JobHandle) -> ServiceFuture<'a, JobPoll>;
}

/// Transport for the steady-state dashboard path.
pub trait SnapshotService: Send + Sync {
    /// Reads the latest aggregated multi-metric snapshot.
    ///
    /// # Errors
    ///
    /// Any transport failure; a backend that has not collected data yet yields
    /// [`RankError::NotFound`].
    fn fetch_snapshot(&self) -> ServiceFuture<'_, Snapshot>;

    /// Asks the backend to start a collection run. Acknowledged by status only.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status.
    fn request_refresh(&self) -> ServiceFuture<'_, ()>;
}
