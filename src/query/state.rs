use super::cache::{CacheEntry, QueryStatus};
use super::error::QueryError;
use super::key::QueryKey;

/// The state of a query as seen by a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// No data yet; a fetch is in flight.
    Loading,
    /// Data is available.
    Success {
        /// The data returned by the query.
        data: T,
        /// Whether the data is stale (invalidated, possibly being refetched).
        is_stale: bool,
    },
    /// The last fetch failed.
    Error(QueryError),
}

impl<T: Clone + 'static> QueryState<T> {
    /// Projects a type-erased cache entry into a typed state.
    pub(crate) fn from_entry(key: &QueryKey, entry: &CacheEntry) -> Self {
        let data = entry.value.as_ref().map(|v| v.downcast_ref::<T>().cloned());
        match (entry.status, data) {
            (_, Some(None)) => Self::Error(QueryError::Network(format!(
                "cached value for {key} has an unexpected type"
            ))),
            (QueryStatus::Error, _) => Self::Error(
                entry
                    .error
                    .clone()
                    .unwrap_or_else(|| QueryError::Network(format!("fetch for {key} failed"))),
            ),
            (QueryStatus::Success, Some(Some(data))) => Self::Success {
                data,
                is_stale: entry.is_stale,
            },
            // previous data stays visible while a refetch is pending
            (QueryStatus::Idle | QueryStatus::Loading, Some(Some(data))) => Self::Success {
                data,
                is_stale: true,
            },
            _ => Self::Loading,
        }
    }
}

/// A query result: the key it belongs to and its current state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// The key of the cache entry this result was read from.
    pub key: QueryKey,
    /// The current state of the query.
    pub state: QueryState<T>,
}

impl<T> QueryResult<T> {
    /// Returns the data if the query succeeded, otherwise `None`.
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns the error if the query failed, otherwise `None`.
    pub const fn error(&self) -> Option<&QueryError> {
        match &self.state {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if the query is currently loading.
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    /// Returns `true` if the query succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.state, QueryState::Success { .. })
    }

    /// Returns `true` if the query failed.
    pub const fn is_error(&self) -> bool {
        matches!(self.state, QueryState::Error(_))
    }

    /// Returns `true` if the query data is stale.
    pub const fn is_stale(&self) -> bool {
        matches!(self.state, QueryState::Success { is_stale: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key() -> QueryKey {
        QueryKey::list("numbers")
    }

    fn result(state: QueryState<i32>) -> QueryResult<i32> {
        QueryResult { key: key(), state }
    }

    #[test]
    fn test_query_result_data() {
        let success = result(QueryState::Success {
            data: 42,
            is_stale: false,
        });
        assert_eq!(success.data(), Some(&42));
        assert_eq!(result(QueryState::Loading).data(), None);

        let error = result(QueryState::Error(QueryError::Network("error".to_string())));
        assert_eq!(error.data(), None);
        assert_eq!(
            error.error(),
            Some(&QueryError::Network("error".to_string()))
        );
    }

    #[test]
    fn test_query_result_predicates() {
        let loading = result(QueryState::Loading);
        assert!(loading.is_loading());
        assert!(!loading.is_success());
        assert!(!loading.is_error());
        assert!(!loading.is_stale());

        let stale = result(QueryState::Success {
            data: 42,
            is_stale: true,
        });
        assert!(!stale.is_loading());
        assert!(stale.is_success());
        assert!(stale.is_stale());

        let error = result(QueryState::Error(QueryError::NotFound("x".to_string())));
        assert!(error.is_error());
        assert!(!error.is_success());
    }

    #[test]
    fn test_from_idle_entry_is_loading() {
        let entry = CacheEntry::new();
        assert_eq!(QueryState::<i32>::from_entry(&key(), &entry), QueryState::Loading);
    }

    #[test]
    fn test_from_refetching_entry_keeps_data() {
        let mut entry = CacheEntry::new();
        entry.start(1);
        entry.settle(1, Ok(Arc::new(5_i32)));
        entry.mark_stale();
        entry.start(2);

        assert_eq!(
            QueryState::<i32>::from_entry(&key(), &entry),
            QueryState::Success {
                data: 5,
                is_stale: true
            }
        );
    }

    #[test]
    fn test_from_error_entry() {
        let mut entry = CacheEntry::new();
        entry.start(1);
        entry.settle(1, Err(QueryError::NotFound("/blogs/9".to_string())));

        assert_eq!(
            QueryState::<i32>::from_entry(&key(), &entry),
            QueryState::Error(QueryError::NotFound("/blogs/9".to_string()))
        );
    }

    #[test]
    fn test_from_entry_with_wrong_type() {
        let mut entry = CacheEntry::new();
        entry.start(1);
        entry.settle(1, Ok(Arc::new("text")));

        assert!(matches!(
            QueryState::<i32>::from_entry(&key(), &entry),
            QueryState::Error(QueryError::Network(_))
        ));
    }
}
