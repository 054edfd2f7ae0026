use std::time::Duration;

/// Configuration for query behavior.
///
/// This controls when a successfully cached value is considered stale and
/// therefore refetched by the next read.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// How long data is considered fresh after it was fetched.
    ///
    /// While fresh, reads are served from the cache. Once stale, the next read
    /// refetches. Explicit invalidation makes an entry stale regardless.
    pub stale_time: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::MAX, // only invalidation makes data stale
        }
    }
}

impl QueryConfig {
    /// Creates a new query configuration with the given stale time.
    #[must_use]
    pub const fn new(stale_time: Duration) -> Self {
        Self { stale_time }
    }
}
