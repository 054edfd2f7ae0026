//! The three screens: post list, post detail and the create form.
//!
//! Every screen owns the state it renders and the subscriptions that feed it.
//! Remote data reaches a screen only through [`Query`] subscriptions on the
//! shared [`QueryClient`], so leaving a screen cancels its reads and two
//! screens showing the same key share one fetch.

pub mod create;
pub mod detail;
pub mod list;

use std::sync::Arc;

use crate::api::{BlogPost, BlogSource};
use crate::query::{Query, QueryClient, QueryKey};

/// Resource name of the post collection in the query cache.
pub const POSTS: &str = "posts";

/// Where the application is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Detail(String),
    Create,
}

/// Shared handles injected into every screen.
#[derive(Clone)]
pub struct Services {
    pub query_client: Arc<QueryClient>,
    pub api: Arc<dyn BlogSource>,
}

impl Services {
    #[must_use]
    pub fn new(query_client: Arc<QueryClient>, api: Arc<dyn BlogSource>) -> Self {
        Self { query_client, api }
    }

    /// Reads the whole collection, newest first.
    #[must_use]
    pub fn posts_query(&self) -> Query<Vec<BlogPost>> {
        let api = Arc::clone(&self.api);
        Query::new(
            QueryKey::list(POSTS),
            move || {
                let api = Arc::clone(&api);
                Box::pin(async move { api.list_posts().await })
            },
            Arc::clone(&self.query_client),
        )
    }

    /// Reads a single post.
    #[must_use]
    pub fn post_query(&self, id: &str) -> Query<BlogPost> {
        let api = Arc::clone(&self.api);
        let post_id = id.to_string();
        Query::new(
            QueryKey::item(POSTS, id),
            move || {
                let api = Arc::clone(&api);
                let post_id = post_id.clone();
                Box::pin(async move { api.get_post(&post_id).await })
            },
            Arc::clone(&self.query_client),
        )
    }
}
