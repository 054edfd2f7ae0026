//! # folio
//!
//! A terminal front end for a blog. Posts live in a remote JSON collection;
//! folio lists them, shows one post with related reading, and publishes new
//! ones.
//!
//! ## Architecture
//!
//! The UI follows the Elm Architecture:
//!
//! - [`Application`](application::Application): state, `update` and `view`
//! - [`Runtime`](runtime::Runtime): drives the event loop
//! - [`Command`](command::Command): one-off asynchronous effects
//! - [`Subscription`](subscription::Subscription): long-lived message sources,
//!   started and cancelled as screens come and go
//!
//! Remote data flows through a shared [`QueryClient`](query::QueryClient). Each
//! cache entry is fetched at most once at a time no matter how many screens
//! read it, and [`invalidate`](query::QueryClient::invalidate) makes every
//! live reader refetch. Network access is behind the
//! [`BlogSource`](api::BlogSource) trait.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use folio::api::BlogClient;
//! use folio::app::{App, Flags};
//! use folio::config::Config;
//! use folio::query::QueryClient;
//! use folio::runtime::Runtime;
//! use folio::views::Services;
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::eyre::Result<()> {
//!     let config = Config::from_env()?;
//!     let services = Services::new(
//!         Arc::new(QueryClient::new()),
//!         Arc::new(BlogClient::new(config.api_url.clone())),
//!     );
//!     let frame_rate = config.frame_rate;
//!
//!     let mut terminal = ratatui::init();
//!     let result = Runtime::<App>::new(Flags { config, services }, frame_rate)
//!         .run(&mut terminal)
//!         .await;
//!     ratatui::restore();
//!     result
//! }
//! ```

pub mod api;
pub mod app;
pub mod application;
pub mod command;
pub mod config;
pub mod prelude;
pub mod query;
pub mod runtime;
pub mod subscription;
pub mod views;
