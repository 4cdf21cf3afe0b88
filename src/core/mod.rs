//! Core components of the `cryptorank-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`RankClient`] and its builder.
//! - The primary [`RankError`] type.
//! - Shared data models like [`Criterion`] and [`RankedRecord`].
//! - The service traits the poll controller and dashboard are written against.

/// The main client (`RankClient`), builder, and retry configuration.
pub mod client;
/// The primary error type (`RankError`) for the crate.
pub mod error;
/// Shared data models used across the job and snapshot paths.
pub mod models;
/// Service traits for abstracting the backend transport.
pub mod services;

pub(crate) mod net;
pub(crate) mod schedule;
pub(crate) mod wire;

/// Subscriber setup (`init_tracing`).
#[cfg(feature = "tracing-subscriber")]
pub mod logging;

// convenient re-exports so most code can just `use crate::core::RankClient`
pub use client::{Backoff, RankClient, RankClientBuilder, RetryConfig};
pub use error::RankError;
pub use models::{
    Criterion, JobHandle, MAX_RESULT_COUNT, MIN_RESULT_COUNT, Priority, RankedRecord,
    RankingRequest, ValueFormat,
};
pub use services::{JobPoll, RankingService, ServiceFuture, SnapshotService};
