use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::QueryError;

/// A type-erased cached value. Entries for different keys hold different types.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Lifecycle status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No fetch has been issued, or the last one was superseded.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed.
    Error,
}

/// A cached entry with status, staleness and generation information.
#[derive(Clone)]
pub struct CacheEntry {
    pub status: QueryStatus,
    pub value: Option<CachedValue>,
    pub error: Option<QueryError>,
    pub is_stale: bool,
    /// Generation of the fetch this entry trusts. `0` means none.
    pub generation: u64,
    /// When the entry last settled.
    pub timestamp: Option<Instant>,
}

impl CacheEntry {
    /// Creates an idle entry with no value.
    pub const fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            is_stale: false,
            generation: 0,
            timestamp: None,
        }
    }

    /// Checks if this entry is stale based on the given stale time.
    pub fn check_staleness(&mut self, stale_time: Duration) -> bool {
        let expired = self
            .timestamp
            .is_some_and(|timestamp| timestamp.elapsed() > stale_time);
        if expired && self.status == QueryStatus::Success {
            self.is_stale = true;
        }
        self.is_stale
    }

    /// Returns `true` if a read should issue a new fetch.
    pub const fn needs_fetch(&self) -> bool {
        match self.status {
            QueryStatus::Idle | QueryStatus::Error => true,
            QueryStatus::Loading => false,
            QueryStatus::Success => self.is_stale,
        }
    }

    /// Transitions to `Loading` under the given fetch generation.
    pub const fn start(&mut self, generation: u64) {
        self.status = QueryStatus::Loading;
        self.generation = generation;
    }

    /// Applies a fetch completion.
    ///
    /// Returns `false` and leaves the entry untouched if `generation` is not the
    /// one the entry currently trusts.
    pub fn settle(&mut self, generation: u64, result: Result<CachedValue, QueryError>) -> bool {
        if generation != self.generation || self.status != QueryStatus::Loading {
            return false;
        }
        match result {
            Ok(value) => {
                self.status = QueryStatus::Success;
                self.value = Some(value);
                self.error = None;
            }
            Err(e) => {
                // keep the last good value around
                self.status = QueryStatus::Error;
                self.error = Some(e);
            }
        }
        self.is_stale = false;
        self.timestamp = Some(Instant::now());
        true
    }

    /// Marks this entry as stale.
    ///
    /// A loading entry is superseded: it returns to `Idle` and stops trusting
    /// its in-flight fetch, whose result may predate the change being signalled.
    pub fn mark_stale(&mut self) {
        self.is_stale = true;
        if self.status == QueryStatus::Loading {
            self.status = QueryStatus::Idle;
            self.generation = 0;
        }
    }
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("status", &self.status)
            .field("has_value", &self.value.is_some())
            .field("error", &self.error)
            .field("is_stale", &self.is_stale)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
