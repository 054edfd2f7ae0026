//! Prelude module for convenient imports.
//!
//! ```
//! use folio::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`Application`], [`Command`], [`Action`], [`Subscription`] and [`Runtime`]
//!   for the event loop
//! - [`Query`], [`QueryClient`], [`QueryKey`], [`QueryResult`], [`QueryState`]
//!   and [`QueryError`] for cached reads
//! - [`Mutation`] and [`MutationState`] for writes
//! - [`BlogSource`] and [`BlogPost`] for the remote collection

pub use crate::api::{BlogPost, BlogSource};
pub use crate::application::Application;
pub use crate::command::{Action, Command};
pub use crate::query::{
    Mutation, MutationState, Query, QueryClient, QueryError, QueryKey, QueryResult, QueryState,
};
pub use crate::runtime::Runtime;
pub use crate::subscription::Subscription;
