//! Store collaborator boundary.
//!
//! All persistence lives behind [`ForumStore`]; the presentation core only
//! transforms data the store has already fetched. Page/count pairs returned
//! by the paginated queries must be computed from the same predicate, so a
//! filter can never report a total that disagrees with its rows.

use crate::domain::{Comment, Post};
use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store collaborators.
///
/// Backend failures carry the operation name and target id so callers can
/// log them with context; the core treats them as non-retriable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("{operation} failed for id {id}: {message}")]
    Backend {
        operation: &'static str,
        id: u64,
        message: String,
    },
}

/// Persistence collaborator for posts, comments, hashtags, and users.
///
/// Implementations wrap a relational store; none of the presentation logic
/// lives here.
#[allow(async_fn_in_trait)]
pub trait ForumStore {
    /// Fetches the flat comment set for a post, in creation order.
    async fn fetch_comments(&self, post_id: u64) -> Result<Vec<Comment>>;

    /// Creates a comment and returns its id. The nesting-depth check is
    /// enforced by the caller ([`crate::session::Session::submit_reply`]),
    /// not here, so it runs exactly once.
    async fn create_comment(
        &self,
        post_id: u64,
        parent_id: Option<u64>,
        body: &str,
    ) -> Result<u64>;

    /// Deletes a comment and all of its descendant replies.
    ///
    /// Cascading is deliberate: the tree builder drops replies whose parent
    /// is missing from the loaded set, so orphaned children would silently
    /// disappear from every rendered thread anyway.
    async fn delete_comment(&self, comment_id: u64) -> Result<()>;

    /// One page of the full post set, newest first, plus the total count.
    async fn fetch_posts_page(&self, offset: usize, limit: usize) -> Result<(Vec<Post>, usize)>;

    /// The full post set, newest first. Used by the free-text branch, which
    /// filters and paginates client-side.
    async fn fetch_posts_all(&self) -> Result<Vec<Post>>;

    /// One page of a category, plus the category's total count.
    async fn fetch_posts_by_category(
        &self,
        category_id: u64,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Post>, usize)>;

    /// Every post in a category, newest first.
    async fn fetch_posts_by_category_all(&self, category_id: u64) -> Result<Vec<Post>>;

    /// One page of posts carrying **every** named hashtag (intersection),
    /// matched case-insensitively, plus the matching total count.
    async fn fetch_posts_by_hashtags(
        &self,
        hashtags: &[String],
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Post>, usize)>;

    /// Resolves a user id to a display name.
    async fn resolve_username(&self, user_id: u64) -> Result<String>;

    /// Resolves the hashtag names attached to a post.
    async fn resolve_hashtags(&self, post_id: u64) -> Result<Vec<String>>;
}
