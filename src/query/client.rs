use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use tokio::sync::watch;
use tracing::{debug, trace};

use super::cache::{CacheEntry, CachedValue, QueryStatus};
use super::config::QueryConfig;
use super::error::QueryError;
use super::key::QueryKey;
use super::state::QueryState;

/// An async function producing the value for a cache entry.
pub type Fetcher<V> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, QueryError>> + Send + Sync>;

type Slot = Arc<watch::Sender<CacheEntry>>;

/// A client for managing the query cache and invalidation.
///
/// The `QueryClient` is the central state manager for queries. It handles:
/// - Caching query results per [`QueryKey`]
/// - Deduplicating reads: at most one fetch per key is trusted at a time
/// - Notifying subscribers whenever an entry changes
/// - Invalidation by resource prefix
///
/// It is created once at startup and shared as `Arc<QueryClient>` by every view.
///
/// # Example
///
/// ```rust
/// use folio::query::{QueryClient, QueryConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let client = Arc::new(QueryClient::with_config(QueryConfig::new(
///     Duration::from_secs(30),
/// )));
/// assert!(client.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct QueryClient {
    cache: Arc<DashMap<QueryKey, Slot>>,
    next_generation: Arc<AtomicU64>,
    config: QueryConfig,
}

impl QueryClient {
    /// Creates a new query client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    /// Creates a new query client with the given configuration.
    #[must_use]
    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            next_generation: Arc::new(AtomicU64::new(1)),
            config,
        }
    }

    /// Subscribes to an entry: emits its current state, then every change.
    ///
    /// The first poll issues a fetch unless the entry holds fresh data or a
    /// fetch is already in flight. When the entry is later invalidated, the
    /// stream refetches on its own, so every live subscriber stays in sync
    /// with one fetch per key.
    ///
    /// Dropping the stream releases the subscription; an in-flight fetch still
    /// settles the cache entry.
    pub fn read<V>(&self, key: QueryKey, fetcher: Fetcher<V>) -> BoxStream<'static, QueryState<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let client = self.clone();

        stream::unfold(ReadState::Initial, move |state| {
            let client = client.clone();
            let key = key.clone();
            let fetcher = fetcher.clone();

            async move {
                let mut rx = match state {
                    ReadState::Initial => client.begin(&key, &fetcher),
                    ReadState::Watching { mut rx } => {
                        // Sender lives in the cache map, so this only ends with the client
                        rx.changed().await.ok()?;
                        let refetch = {
                            let entry = rx.borrow();
                            entry.is_stale && entry.needs_fetch()
                        };
                        if refetch {
                            client.begin(&key, &fetcher)
                        } else {
                            rx
                        }
                    }
                };

                let state = QueryState::from_entry(&key, &rx.borrow_and_update());
                Some((state, ReadState::Watching { rx }))
            }
        })
        .boxed()
    }

    /// Reads an entry once, waiting for an in-flight fetch if necessary.
    ///
    /// Shares the deduplication of [`QueryClient::read`]: concurrent calls for
    /// the same key issue a single fetch.
    ///
    /// # Errors
    ///
    /// Returns the error the fetch settled with.
    pub async fn fetch<V, F>(&self, key: &QueryKey, fetcher: F) -> Result<V, QueryError>
    where
        V: Clone + Send + Sync + 'static,
        F: Fn() -> BoxFuture<'static, Result<V, QueryError>> + Send + Sync + 'static,
    {
        let fetcher: Fetcher<V> = Arc::new(fetcher);
        let mut rx = self.begin(key, &fetcher);

        loop {
            let entry = rx.borrow_and_update().clone();
            match entry.status {
                QueryStatus::Loading => {}
                // superseded by an invalidation while we waited
                QueryStatus::Idle => {
                    rx = self.begin(key, &fetcher);
                    continue;
                }
                QueryStatus::Success | QueryStatus::Error => {
                    return match QueryState::<V>::from_entry(key, &entry) {
                        QueryState::Success { data, .. } => Ok(data),
                        QueryState::Error(e) => Err(e),
                        QueryState::Loading => Err(QueryError::Network(format!(
                            "entry for {key} settled without a value"
                        ))),
                    };
                }
            }

            if rx.changed().await.is_err() {
                return Err(QueryError::Network(format!("cache entry for {key} was dropped")));
            }
        }
    }

    /// Marks every entry under the resource `prefix` as stale.
    ///
    /// Active subscribers refetch immediately; other entries refetch on their
    /// next read. A fetch in flight for a matching key is superseded and its
    /// result discarded. Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let slots: Vec<Slot> = self
            .cache
            .iter()
            .filter(|item| item.key().matches(prefix))
            .map(|item| Arc::clone(item.value()))
            .collect();

        for slot in &slots {
            slot.send_modify(CacheEntry::mark_stale);
        }

        debug!(prefix, count = slots.len(), "invalidated queries");
        slots.len()
    }

    /// Marks a single entry as stale. Returns `false` if the key is not cached.
    pub fn invalidate_key(&self, key: &QueryKey) -> bool {
        let Some(slot) = self.cache.get(key).map(|item| Arc::clone(item.value())) else {
            return false;
        };
        slot.send_modify(CacheEntry::mark_stale);
        debug!(%key, "invalidated query");
        true
    }

    /// Returns the status of the entry for `key`, if one exists.
    #[must_use]
    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.cache.get(key).map(|slot| slot.borrow().status)
    }

    /// Returns `true` if the entry for `key` exists and is stale.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.cache.get(key).is_some_and(|slot| slot.borrow().is_stale)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Gets the query configuration.
    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn slot(&self, key: &QueryKey) -> Slot {
        let slot = self
            .cache
            .entry(key.clone())
            .or_insert_with(|| Arc::new(watch::channel(CacheEntry::new()).0));
        Arc::clone(slot.value())
    }

    /// Starts a fetch for `key` unless the entry can be served as is or a fetch
    /// is already in flight, and returns a receiver positioned on the result.
    fn begin<V>(&self, key: &QueryKey, fetcher: &Fetcher<V>) -> watch::Receiver<CacheEntry>
    where
        V: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(key);
        let stale_time = self.config.stale_time;
        let mut started = None;

        slot.send_if_modified(|entry| {
            entry.check_staleness(stale_time);
            if !entry.needs_fetch() {
                return false;
            }
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            entry.start(generation);
            started = Some(generation);
            true
        });

        let rx = slot.subscribe();
        match started {
            Some(generation) => {
                debug!(%key, generation, "fetch started");
                spawn_fetch(key.clone(), generation, Arc::clone(fetcher), slot);
            }
            None => trace!(%key, "served from cache or joined in-flight fetch"),
        }
        rx
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a fetch to completion and settles the entry, independent of any
/// subscriber, so the entry never stays `Loading` once the fetch is done.
fn spawn_fetch<V>(key: QueryKey, generation: u64, fetcher: Fetcher<V>, slot: Slot)
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = fetcher().await.map(|value| Arc::new(value) as CachedValue);
        let failed = result.as_ref().err().cloned();

        if slot.send_if_modified(|entry| entry.settle(generation, result)) {
            match failed {
                Some(e) => debug!(%key, generation, error = %e, "fetch failed"),
                None => debug!(%key, generation, "fetch succeeded"),
            }
        } else {
            debug!(%key, generation, "discarded stale fetch completion");
        }
    });
}

/// Internal state machine for a read stream.
enum ReadState {
    Initial,
    Watching { rx: watch::Receiver<CacheEntry> },
}
