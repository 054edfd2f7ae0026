//! Access to the remote blog collection.
//!
//! Views never talk to the network directly. They go through a [`BlogSource`],
//! which is either the HTTP-backed [`BlogClient`] or the in-process
//! [`MemoryBlogs`] used by tests.

mod client;
mod memory;
mod post;

use async_trait::async_trait;

use crate::query::QueryError;

pub use client::BlogClient;
pub use memory::MemoryBlogs;
pub use post::{BlogPost, NewBlogPost, PostDraft, sort_newest_first};

/// The three operations of the remote collection.
///
/// Implementations are stateless between calls and never retry.
#[async_trait]
pub trait BlogSource: Send + Sync {
    /// Every post, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Network`] if the collection cannot be read. No
    /// partial list is ever returned.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, QueryError>;

    /// A single post by id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if no post has this id and
    /// [`QueryError::Network`] for any other failure.
    async fn get_post(&self, id: &str) -> Result<BlogPost, QueryError>;

    /// Stores a new post and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if the post is rejected and
    /// [`QueryError::Network`] for any other failure.
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, QueryError>;
}
