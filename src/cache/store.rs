use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::policy::CachePolicy;
use super::refresh::RefreshHandle;
use crate::core::RankError;
use crate::core::services::ServiceFuture;

type Fetcher<K, V> = Arc<dyn Fn(K) -> ServiceFuture<'static, V> + Send + Sync>;

/// A value and when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The cached payload.
    pub value: V,
    /// When the fetch that produced `value` completed.
    pub fetched_at: Instant,
    /// Freshness window measured from `fetched_at`.
    pub stale_after: Duration,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is past its freshness window at `now`.
    pub fn is_stale_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > self.stale_after
    }

    /// Time since the entry was fetched.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Where a value returned by [`QueryCache::read`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served from cache inside the freshness window.
    Fresh,
    /// Served from cache past the freshness window; a background refetch is in flight.
    Stale,
    /// Fetched from the network by this read.
    Fetched,
}

/// Result of a successful [`QueryCache::read`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<V> {
    /// The value.
    pub value: V,
    /// Where it came from.
    pub freshness: Freshness,
    /// When it was fetched.
    pub fetched_at: Instant,
}

/// Everything a view needs to render one key.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<V> {
    /// Last successful fetch, if any.
    pub entry: Option<CacheEntry<V>>,
    /// Whether a fetch for this key is in flight.
    pub is_fetching: bool,
    /// Error from the most recent fetch, cleared by the next success.
    pub error: Option<String>,
}

impl<V> QueryState<V> {
    /// No value yet and a fetch is running: show a loading indicator.
    pub fn is_loading(&self) -> bool {
        self.entry.is_none() && self.is_fetching
    }
}

struct Slot<V> {
    entry: Option<CacheEntry<V>>,
    fetching: bool,
    error: Option<String>,
    gate: Arc<tokio::sync::Mutex<()>>,
    revalidation: Option<JoinHandle<()>>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            entry: None,
            fetching: false,
            error: None,
            gate: Arc::new(tokio::sync::Mutex::new(())),
            revalidation: None,
        }
    }
}

struct Inner<K, V> {
    policy: CachePolicy,
    fetcher: Fetcher<K, V>,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

/// Keyed stale-while-revalidate cache over an async fetch function.
///
/// At most one fetch per key is in flight at a time. Entries are created by the first
/// successful fetch and overwritten in place by later ones; they are never evicted.
pub struct QueryCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> std::fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Cache that fetches misses with `fetch`.
    pub fn new<F, Fut>(policy: CachePolicy, fetch: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, RankError>> + Send + 'static,
    {
        let fetcher: Fetcher<K, V> = Arc::new(move |key| fetch(key).boxed());
        Self {
            inner: Arc::new(Inner {
                policy,
                fetcher,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The cache's policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    /// Reads `key`.
    ///
    /// Fresh entries return without a network call. Stale entries return immediately and
    /// start one background refetch. Misses fetch under the retry policy before returning.
    ///
    /// # Errors
    ///
    /// [`RankError::CacheFetch`] when a miss exhausts the retry budget.
    pub async fn read(&self, key: &K) -> Result<CacheRead<V>, RankError> {
        if let Some(hit) = self.serve_cached(key) {
            return Ok(hit);
        }

        let gate = self.gate(key);
        let _turn = gate.lock().await;
        // another reader may have filled the slot while we waited
        if let Some(hit) = self.serve_cached(key) {
            return Ok(hit);
        }
        let entry = self.fetch_locked(key).await?;
        Ok(CacheRead {
            value: entry.value,
            freshness: Freshness::Fetched,
            fetched_at: entry.fetched_at,
        })
    }

    /// Fetches `key` now regardless of freshness and stores the result.
    ///
    /// # Errors
    ///
    /// [`RankError::CacheFetch`] when the retry budget is exhausted. Any cached value is kept.
    pub async fn refresh(&self, key: &K) -> Result<V, RankError> {
        let gate = self.gate(key);
        let _turn = gate.lock().await;
        Ok(self.fetch_locked(key).await?.value)
    }

    /// What a view should render for `key`.
    pub fn state(&self, key: &K) -> QueryState<V> {
        let slots = self.slots();
        match slots.get(key) {
            Some(slot) => QueryState {
                entry: slot.entry.clone(),
                is_fetching: slot.fetching,
                error: slot.error.clone(),
            },
            None => QueryState {
                entry: None,
                is_fetching: false,
                error: None,
            },
        }
    }

    /// Starts refetching `key` every `refetch_interval`, independent of staleness.
    ///
    /// Returns `None` when the policy disables auto-refresh. The first refetch happens one
    /// period from now.
    pub fn auto_refresh(&self, key: K) -> Option<RefreshHandle> {
        let period = self.inner.policy.refetch_interval?;
        let cache = self.clone();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(_e) = cache.refresh(&key).await {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(error = %_e, "scheduled refresh failed");
                        }
                    }
                    _ = &mut stop_rx => break,
                }
            }
        });

        Some(RefreshHandle::new(join, stop_tx))
    }

    /// Refetches `key` once after `delay`.
    pub fn schedule_refresh(&self, key: K, delay: Duration) -> RefreshHandle {
        let cache = self.clone();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    if let Err(_e) = cache.refresh(&key).await {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %_e, "delayed refresh failed");
                    }
                }
                _ = stop_rx => {}
            }
        });

        RefreshHandle::new(join, stop_tx)
    }

    fn serve_cached(&self, key: &K) -> Option<CacheRead<V>> {
        let now = Instant::now();
        let mut slots = self.slots();
        let slot = slots.get_mut(key)?;
        let entry = slot.entry.as_ref()?;

        if !entry.is_stale_at(now) {
            return Some(CacheRead {
                value: entry.value.clone(),
                freshness: Freshness::Fresh,
                fetched_at: entry.fetched_at,
            });
        }

        let read = CacheRead {
            value: entry.value.clone(),
            freshness: Freshness::Stale,
            fetched_at: entry.fetched_at,
        };
        let revalidate = !slot.fetching;
        slot.fetching = true;
        drop(slots);

        if revalidate {
            #[cfg(feature = "tracing")]
            tracing::debug!("serving stale entry, revalidating in background");
            let cache = self.clone();
            let owned_key = key.clone();
            let join = tokio::spawn(async move {
                if let Err(_e) = cache.refresh(&owned_key).await {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "background revalidation failed");
                }
            });
            if let Some(slot) = self.slots().get_mut(key) {
                slot.revalidation = Some(join);
            }
        }
        Some(read)
    }

    /// Aborts every background revalidation started by stale reads.
    ///
    /// Cached values are kept. Scheduled refreshes are owned by their
    /// [`RefreshHandle`]s and are not affected.
    pub fn cancel_background(&self) {
        let pending: Vec<JoinHandle<()>> = {
            let mut slots = self.slots();
            slots
                .values_mut()
                .filter_map(|slot| {
                    let join = slot.revalidation.take()?;
                    // a task aborted before it started never lowers the flag itself
                    if !join.is_finished() {
                        slot.fetching = false;
                    }
                    Some(join)
                })
                .collect()
        };
        for join in pending {
            join.abort();
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("background revalidations cancelled");
    }

    /// Runs the retry loop. The caller holds the key's gate.
    async fn fetch_locked(&self, key: &K) -> Result<CacheEntry<V>, RankError> {
        let _fetching = FetchingFlag::raise(self, key);
        let retry = &self.inner.policy.retry;
        let attempts = retry.attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match (self.inner.fetcher)(key.clone()).await {
                Ok(value) => {
                    let entry = CacheEntry {
                        value,
                        fetched_at: Instant::now(),
                        stale_after: self.inner.policy.stale_time,
                    };
                    let mut slots = self.slots();
                    let slot = slots.entry(key.clone()).or_default();
                    slot.entry = Some(entry.clone());
                    slot.error = None;
                    return Ok(entry);
                }
                Err(e) if attempt >= attempts => {
                    let message = e.to_string();
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt, error = %message, "fetch failed, retry budget exhausted");
                    self.slots().entry(key.clone()).or_default().error = Some(message.clone());
                    return Err(RankError::CacheFetch {
                        attempts: attempt,
                        message,
                    });
                }
                Err(_e) => {
                    let delay = retry.delay_after(attempt);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, ?delay, error = %_e, "fetch failed, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn gate(&self, key: &K) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(&self.slots().entry(key.clone()).or_default().gate)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a key as fetching until dropped, including when the fetching task is aborted.
struct FetchingFlag<'a, K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: &'a QueryCache<K, V>,
    key: &'a K,
}

impl<'a, K, V> FetchingFlag<'a, K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn raise(cache: &'a QueryCache<K, V>, key: &'a K) -> Self {
        cache.slots().entry(key.clone()).or_default().fetching = true;
        Self { cache, key }
    }
}

impl<K, V> Drop for FetchingFlag<'_, K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(slot) = self.cache.slots().get_mut(self.key) {
            slot.fetching = false;
        }
    }
}
