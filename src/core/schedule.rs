//! Cancellable waits.
//!
//! Every "wait, then try again" step in the crate goes through [`sleep_or_cancel`], so a
//! superseded loop wakes up immediately instead of firing one more stale tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes every waiter. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// How a cancellable wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full duration passed.
    Elapsed,
    /// The token was cancelled first.
    Cancelled,
}

/// Sleeps for `dur` unless `token` is cancelled first.
pub async fn sleep_or_cancel(dur: Duration, token: &CancelToken) -> Wake {
    if token.is_cancelled() {
        return Wake::Cancelled;
    }
    tokio::select! {
        () = tokio::time::sleep(dur) => {
            if token.is_cancelled() { Wake::Cancelled } else { Wake::Elapsed }
        }
        () = token.cancelled() => Wake::Cancelled,
    }
}
