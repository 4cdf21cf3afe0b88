//! The steady-state dashboard: one cached snapshot kept fresh while a view is mounted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::cache::{CachePolicy, CacheRead, QueryCache, QueryState, RefreshHandle};
use crate::core::RankError;
use crate::core::services::SnapshotService;
use crate::snapshot::Snapshot;

/// Cache key for the aggregated snapshot. There is only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotKey;

/// Default wait between a manual refresh request and the re-read that picks it up.
pub const DEFAULT_MANUAL_REREAD_DELAY: Duration = Duration::from_secs(30);

/// Binds a [`SnapshotService`] to a [`QueryCache`] and owns the view's background tasks.
///
/// Dropping the dashboard aborts its auto-refresh loop, any pending re-read, and any
/// background revalidation started by a stale read.
pub struct Dashboard {
    service: Arc<dyn SnapshotService>,
    cache: QueryCache<SnapshotKey, Snapshot>,
    manual_reread_delay: Duration,
    auto_refresh: Mutex<Option<RefreshHandle>>,
    tasks: Mutex<Vec<RefreshHandle>>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("cache", &self.cache)
            .field("manual_reread_delay", &self.manual_reread_delay)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Dashboard with the default [`CachePolicy`].
    pub fn new<S: SnapshotService + 'static>(service: S) -> Self {
        Self::with_policy(Arc::new(service), CachePolicy::default())
    }

    /// Dashboard over a shared service with an explicit policy.
    pub fn with_policy(service: Arc<dyn SnapshotService>, policy: CachePolicy) -> Self {
        let fetch_from = Arc::clone(&service);
        let cache = QueryCache::new(policy, move |_: SnapshotKey| {
            let service = Arc::clone(&fetch_from);
            async move { service.fetch_snapshot().await }
        });
        Self {
            service,
            cache,
            manual_reread_delay: DEFAULT_MANUAL_REREAD_DELAY,
            auto_refresh: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Override the delay before the re-read that follows [`trigger_manual_fetch`](Self::trigger_manual_fetch).
    #[must_use]
    pub fn manual_reread_delay(mut self, delay: Duration) -> Self {
        self.manual_reread_delay = delay;
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &QueryCache<SnapshotKey, Snapshot> {
        &self.cache
    }

    /// First read of a view plus the periodic refresh that runs while it stays mounted.
    ///
    /// Mounting again while the refresh loop is running keeps the existing loop.
    ///
    /// # Errors
    ///
    /// [`RankError::CacheFetch`] if the initial read exhausts its retries. The auto-refresh
    /// loop is started regardless, so the view recovers on its own once the backend does.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn mount(&self) -> Result<CacheRead<Snapshot>, RankError> {
        {
            let mut auto = self.auto_slot();
            if auto.as_ref().is_none_or(RefreshHandle::is_finished) {
                *auto = self.cache.auto_refresh(SnapshotKey);
            }
        }
        self.cache.read(&SnapshotKey).await
    }

    /// Reads the snapshot through the cache.
    ///
    /// # Errors
    ///
    /// [`RankError::CacheFetch`] when nothing is cached and the fetch exhausts its retries.
    pub async fn read(&self) -> Result<CacheRead<Snapshot>, RankError> {
        self.cache.read(&SnapshotKey).await
    }

    /// The user-facing retry: refetch now regardless of freshness.
    ///
    /// # Errors
    ///
    /// [`RankError::CacheFetch`] when the retry budget is exhausted again.
    pub async fn retry(&self) -> Result<Snapshot, RankError> {
        self.cache.refresh(&SnapshotKey).await
    }

    /// Loading flag, last value, and last error for rendering.
    pub fn state(&self) -> QueryState<Snapshot> {
        self.cache.state(&SnapshotKey)
    }

    /// Asks the backend to collect now, then re-reads after the configured delay.
    ///
    /// # Errors
    ///
    /// Failures of the refresh request itself. No re-read is scheduled in that case.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn trigger_manual_fetch(&self) -> Result<(), RankError> {
        self.service.request_refresh().await?;
        #[cfg(feature = "tracing")]
        tracing::info!(delay = ?self.manual_reread_delay, "manual collection requested");
        let handle = self
            .cache
            .schedule_refresh(SnapshotKey, self.manual_reread_delay);
        self.keep(handle);
        Ok(())
    }

    /// Stops every background task owned by this view. Cached data is kept.
    pub fn teardown(&self) {
        if let Some(handle) = self.auto_slot().take() {
            handle.abort();
        }
        let tasks = std::mem::take(&mut *self.tasks());
        for handle in tasks {
            handle.abort();
        }
        self.cache.cancel_background();
    }

    fn keep(&self, handle: RefreshHandle) {
        let mut tasks = self.tasks();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<RefreshHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn auto_slot(&self) -> MutexGuard<'_, Option<RefreshHandle>> {
        self.auto_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Freshness;
    use crate::core::services::ServiceFuture;
    use crate::snapshot::AggregateStats;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Backend {
        reads: AtomicU32,
        refreshes: AtomicU32,
        fail_reads: AtomicU32,
    }

    impl SnapshotService for Backend {
        fn fetch_snapshot(&self) -> ServiceFuture<'_, Snapshot> {
            Box::pin(async move {
                let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
                if self.fail_reads.load(Ordering::SeqCst) > 0 {
                    self.fail_reads.fetch_sub(1, Ordering::SeqCst);
                    return Err(RankError::NotFound {
                        url: "/api/crypto/data".into(),
                        message: "no data available yet".into(),
                    });
                }
                Ok(Snapshot {
                    timestamp: Utc.timestamp_opt(1_700_000_000 + i64::from(n), 0).unwrap(),
                    results: HashMap::new(),
                    stats: AggregateStats::default(),
                })
            })
        }

        fn request_refresh(&self) -> ServiceFuture<'_, ()> {
            Box::pin(async move {
                self.refreshes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    fn dashboard(backend: &Arc<Backend>) -> Dashboard {
        Dashboard::with_policy(backend.clone(), CachePolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn mount_reads_then_auto_refreshes() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);

        let first = dash.mount().await.unwrap();
        assert_eq!(first.freshness, Freshness::Fetched);
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5 * 60 + 1)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);

        dash.teardown();
        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_fetch_rereads_after_delay() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);
        dash.read().await.unwrap();

        dash.trigger_manual_fetch().await.unwrap();
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);

        let fresh = dash.read().await.unwrap();
        assert_eq!(fresh.freshness, Freshness::Fresh);
        assert_eq!(fresh.value.timestamp.timestamp(), 1_700_000_002);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mount_shows_error_and_retry_recovers() {
        let backend = Arc::new(Backend::default());
        backend.fail_reads.store(3, Ordering::SeqCst);
        let dash = dashboard(&backend);

        let err = dash.read().await.unwrap_err();
        assert!(matches!(err, RankError::CacheFetch { attempts: 3, .. }));
        let state = dash.state();
        assert!(state.entry.is_none());
        assert!(state.error.unwrap().contains("no data available yet"));

        dash.retry().await.unwrap();
        let state = dash.state();
        assert!(state.entry.is_some());
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn remount_keeps_a_single_refresh_schedule() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);

        dash.mount().await.unwrap();
        let again = dash.mount().await.unwrap();
        assert_eq!(again.freshness, Freshness::Fresh);
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5 * 60 + 5)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn mount_after_teardown_restarts_refresh() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);
        dash.mount().await.unwrap();
        dash.teardown();

        dash.mount().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5 * 60 + 5)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_stale_revalidation_mid_retry() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);
        dash.read().await.unwrap();

        tokio::time::advance(Duration::from_secs(10 * 60)).await;
        backend.fail_reads.store(3, Ordering::SeqCst);
        let stale = dash.read().await.unwrap();
        assert_eq!(stale.freshness, Freshness::Stale);

        // first background attempt fails, the retry is waiting out its backoff
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);

        dash.teardown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
        assert!(!dash.state().is_fetching);
        assert!(dash.state().entry.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_before_revalidation_starts_prevents_it() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);
        dash.read().await.unwrap();

        tokio::time::advance(Duration::from_secs(10 * 60)).await;
        backend.fail_reads.store(3, Ordering::SeqCst);
        dash.read().await.unwrap();
        drop(dash);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_reread() {
        let backend = Arc::new(Backend::default());
        let dash = dashboard(&backend);
        dash.trigger_manual_fetch().await.unwrap();
        drop(dash);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.reads.load(Ordering::SeqCst), 0);
    }
}
