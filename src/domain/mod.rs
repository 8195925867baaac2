//! Domain models shared across store, search, thread, and feed layers.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Depth cap for reply nesting. Top-level comments sit at level 1.
pub const MAX_DEPTH: u8 = 5;

/// Display name substituted when an author lookup fails.
pub const UNKNOWN_USER: &str = "Unknown User";

/// A forum comment as fetched from the store, flat and parent-linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub parent_id: Option<u64>,
    pub author_id: u64,
    pub body: String,
    pub created_at_unix_ms: i64,
    pub likes: u32,
    /// Denormalized nesting hint from the store. Presentation never trusts
    /// it; levels are recomputed from the parent chain on every build.
    pub level: u8,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A forum post row as fetched from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub author_id: u64,
    pub category_id: u64,
    pub created_at_unix_ms: i64,
    pub updated_at_unix_ms: i64,
    pub likes: u32,
}

/// A hashtag row. Tag text is stored lower-cased; matching is
/// case-insensitive at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: u64,
    pub name: String,
}

impl Hashtag {
    /// Tag names are 1 to `max_len` characters, alphanumeric only.
    pub fn is_valid_name(name: &str, max_len: usize) -> bool {
        let length = name.chars().count();
        (1..=max_len).contains(&length) && name.chars().all(char::is_alphanumeric)
    }
}

/// A rendered comment node. Ephemeral: discarded and rebuilt on every
/// reload of the underlying comment set.
#[derive(Debug, Clone)]
pub struct CommentViewNode {
    pub comment: Comment,
    /// Resolved display name, or [`UNKNOWN_USER`] when resolution failed.
    pub author: String,
    /// Recomputed nesting level; 1 for top-level nodes.
    pub level: u8,
    pub expanded: bool,
    /// Pending reply input attached to this node.
    pub reply_draft: String,
    /// Child order equals the order replies appeared in the fetched set.
    pub replies: Vec<CommentViewNode>,
}

impl CommentViewNode {
    pub fn total_comments(&self) -> usize {
        1 + self
            .replies
            .iter()
            .map(CommentViewNode::total_comments)
            .sum::<usize>()
    }
}

/// An enriched feed row shown on the post-listing screen.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: String,
    pub hashtags: Vec<String>,
    /// Relative age label, e.g. `"3h ago"`.
    pub age: String,
}

/// Formats a unix-ms creation timestamp as a coarse relative age.
pub fn format_relative_age(unix_ms: i64) -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or_default();

    let age_ms = (now_ms - unix_ms).max(0) as u64;
    if age_ms < 60_000 {
        return "just now".to_owned();
    }

    let formatted = humantime::format_duration(Duration::from_millis(age_ms)).to_string();

    // Take only the most significant unit (first space-delimited token) + "ago".
    let unit = formatted.split_whitespace().next().unwrap_or("?");
    format!("{unit} ago")
}
