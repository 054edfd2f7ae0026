use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::subscription::{SubscriptionId, SubscriptionSource};

use super::client::{Fetcher, QueryClient};
use super::error::QueryError;
use super::key::QueryKey;
use super::state::QueryResult;

/// A query subscription that reads a cache entry and follows its changes.
///
/// When subscribed:
///
/// 1. If fresh cached data exists, it's immediately emitted as `Success`
/// 2. If a fetch for the key is in flight, the subscription joins it
/// 3. Otherwise a fetch is triggered and `Loading` is emitted
/// 4. When the key is invalidated, the query refetches and emits again
///
/// Two queries with the same key are the same subscription, so switching a
/// screen between keys cancels the old query and starts the new one.
///
/// # Example
///
/// ```rust,ignore
/// use folio::query::{Query, QueryClient, QueryKey};
/// use folio::subscription::Subscription;
///
/// let sub = Subscription::new(Query::new(
///     QueryKey::list("posts"),
///     move || {
///         let api = api.clone();
///         Box::pin(async move { api.list_posts().await })
///     },
///     client.clone(),
/// ))
/// .map(Message::Posts);
/// ```
pub struct Query<V> {
    key: QueryKey,
    fetcher: Fetcher<V>,
    client: Arc<QueryClient>,
}

impl<V> Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new query with the given key, fetcher, and client.
    ///
    /// # Arguments
    ///
    /// * `key` - Identifies the cache entry
    /// * `fetcher` - An async function that fetches the data
    /// * `client` - The shared query client
    pub fn new<F>(key: QueryKey, fetcher: F, client: Arc<QueryClient>) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<V, QueryError>> + Send + Sync + 'static,
    {
        Self {
            key,
            fetcher: Arc::new(fetcher),
            client,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl<V> SubscriptionSource for Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = QueryResult<V>;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        let key = self.key.clone();
        self.client
            .read(self.key.clone(), Arc::clone(&self.fetcher))
            .map(move |state| QueryResult {
                key: key.clone(),
                state,
            })
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

impl<V> Hash for Query<V> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.key.hash(hasher);
    }
}
