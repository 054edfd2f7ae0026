use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::query::QueryError;

use super::BlogSource;
use super::post::{BlogPost, NewBlogPost, sort_newest_first};

/// An in-process [`BlogSource`].
///
/// Ids are assigned sequentially after the largest numeric id present. The
/// source counts the calls it receives and can be taken offline, in which case
/// every call fails with [`QueryError::Network`].
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use folio::api::{BlogSource, MemoryBlogs};
///
/// let blogs = MemoryBlogs::new();
/// assert!(blogs.list_posts().await.unwrap().is_empty());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryBlogs {
    posts: Mutex<Vec<BlogPost>>,
    offline: AtomicBool,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl MemoryBlogs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_posts(posts: impl IntoIterator<Item = BlogPost>) -> Self {
        Self {
            posts: Mutex::new(posts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Delays every call by `latency`, so overlapping reads can be observed.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While offline, every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// A copy of the stored posts in insertion order.
    pub fn posts(&self) -> Vec<BlogPost> {
        self.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<BlogPost>> {
        self.posts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn call(&self, counter: &AtomicUsize) -> Result<(), QueryError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(QueryError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

/// One past the largest numeric id, or `None` once `u64::MAX` is taken.
fn next_id(posts: &[BlogPost]) -> Option<String> {
    let last = posts
        .iter()
        .filter_map(|post| post.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    last.checked_add(1).map(|id| id.to_string())
}

#[async_trait]
impl BlogSource for MemoryBlogs {
    async fn list_posts(&self) -> Result<Vec<BlogPost>, QueryError> {
        self.call(&self.list_calls).await?;
        let mut posts = self.posts();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> Result<BlogPost, QueryError> {
        self.call(&self.get_calls).await?;
        self.lock()
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or_else(|| QueryError::NotFound(format!("post {id}")))
    }

    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, QueryError> {
        self.call(&self.create_calls).await?;
        if post.title.trim().is_empty() {
            return Err(QueryError::Validation("title is required".to_string()));
        }

        let mut posts = self.lock();
        let id = next_id(&posts)
            .ok_or_else(|| QueryError::Validation("no post ids left".to_string()))?;
        let created = post.with_id(id);
        posts.push(created.clone());
        debug!(id = %created.id, "stored post");
        Ok(created)
    }
}
