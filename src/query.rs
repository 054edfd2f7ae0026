//! Query caching and mutations, similar to SWR or TanStack Query.
//!
//! # Features
//!
//! - **Queries**: subscription-based reads backed by a shared [`QueryClient`];
//!   concurrent reads of one key share a single fetch
//! - **Mutations**: command-based writes (see [`Mutation`])
//! - **Invalidation**: [`QueryClient::invalidate`] marks every entry under a
//!   resource stale, and subscribed queries refetch
//!
//! Each cache entry moves through `idle → loading → {success, error}`. A
//! success entry only goes back to loading after invalidation, an error entry
//! only on a fresh read. Every fetch carries a generation tag, and a completion
//! whose generation is no longer current is dropped.

mod cache;
mod client;
mod config;
mod error;
mod key;
pub mod mutation;
mod source;
mod state;

pub use cache::QueryStatus;
pub use client::{Fetcher, QueryClient};
pub use config::QueryConfig;
pub use error::{ErrorKind, QueryError};
pub use key::QueryKey;
pub use mutation::{Mutation, MutationState};
pub use source::Query;
pub use state::{QueryResult, QueryState};
