//! agora library crate.
//!
//! Presentation core for a threaded discussion-forum client: reply-forest
//! assembly, collapse state, duplicate-submission guarding, fuzzy search,
//! and paginated feed queries. Persistence and rendering live behind the
//! [`store::ForumStore`] boundary and the view layer respectively.

pub mod config;
pub mod domain;
pub mod feed;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod search;
pub mod session;
pub mod store;
pub mod thread;
