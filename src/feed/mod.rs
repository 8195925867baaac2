//! Paginated, multi-criteria post listing.

use crate::domain::{Post, PostView, UNKNOWN_USER, format_relative_age};
use crate::search;
use crate::store::{ForumStore, StoreError};
use thiserror::Error;

/// Fixed feed page size.
pub const PAGE_SIZE: usize = 5;

/// Sentinel hashtag selection meaning "no hashtag restriction". Mutually
/// exclusive with any concrete hashtag.
pub const HASHTAG_ALL: &str = "All";

/// Errors for feed queries.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("page number must be at least 1")]
    InvalidPage,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One resolved feed page.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub items: Vec<PostView>,
    pub total_count: usize,
    pub total_pages: usize,
}

/// Feed filter and pagination input.
///
/// Every filter mutation re-clamps the page to 1, so a narrowed result set
/// can never point past its own last page. The hashtag selection always
/// holds either the [`HASHTAG_ALL`] sentinel alone or concrete tags alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    category: Option<u64>,
    hashtags: Vec<String>,
    text: String,
    page: usize,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            category: None,
            hashtags: vec![HASHTAG_ALL.to_owned()],
            text: String::new(),
            page: 1,
        }
    }
}

impl FeedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<u64> {
        self.category
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_category(&mut self, category: Option<u64>) {
        self.category = category;
        self.page = 1;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.page = 1;
    }

    /// Sets the 1-based page number. A zero page is rejected at query time.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Toggles one hashtag selection.
    ///
    /// Selecting [`HASHTAG_ALL`] clears every concrete selection; selecting a
    /// concrete tag removes the sentinel; deselecting the last concrete tag
    /// re-adds it. The selection is never empty.
    pub fn toggle_hashtag(&mut self, name: &str) {
        self.page = 1;

        if name == HASHTAG_ALL {
            self.hashtags = vec![HASHTAG_ALL.to_owned()];
            return;
        }

        if let Some(position) = self.hashtags.iter().position(|tag| tag == name) {
            self.hashtags.remove(position);
            if self.hashtags.is_empty() {
                self.hashtags.push(HASHTAG_ALL.to_owned());
            }
        } else {
            self.hashtags.retain(|tag| tag != HASHTAG_ALL);
            self.hashtags.push(name.to_owned());
        }
    }

    /// Returns the concrete hashtag selection, or `None` when the sentinel
    /// (or nothing) is selected.
    fn concrete_hashtags(&self) -> Option<&[String]> {
        let concrete = !self.hashtags.is_empty()
            && self.hashtags.iter().all(|tag| tag != HASHTAG_ALL);
        concrete.then_some(self.hashtags.as_slice())
    }
}

/// Resolves one feed page for `query`.
///
/// Branch order, first applicable wins: hashtag intersection (store
/// paginated), category, then the unfiltered set. A free-text filter inside
/// the last two branches fetches the whole candidate set, ranks titles with
/// the tiered matcher, and paginates the filtered list client-side; its
/// total is the filtered length, never the unfiltered count. Row enrichment
/// failures degrade to placeholders instead of failing the page.
pub async fn query_feed<S: ForumStore>(store: &S, query: &FeedQuery) -> Result<FeedPage, FeedError> {
    if query.page() == 0 {
        return Err(FeedError::InvalidPage);
    }
    let offset = (query.page() - 1) * PAGE_SIZE;

    let (posts, total_count) = if let Some(hashtags) = query.concrete_hashtags() {
        store
            .fetch_posts_by_hashtags(hashtags, offset, PAGE_SIZE)
            .await?
    } else if let Some(category_id) = query.category() {
        if query.text().is_empty() {
            store
                .fetch_posts_by_category(category_id, offset, PAGE_SIZE)
                .await?
        } else {
            let candidates = store.fetch_posts_by_category_all(category_id).await?;
            let filtered = filter_by_title(query.text(), candidates);
            let total = filtered.len();
            (paginate(filtered, offset), total)
        }
    } else if query.text().is_empty() {
        store.fetch_posts_page(offset, PAGE_SIZE).await?
    } else {
        let candidates = store.fetch_posts_all().await?;
        let filtered = filter_by_title(query.text(), candidates);
        let total = filtered.len();
        (paginate(filtered, offset), total)
    };

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        items.push(enrich(store, post).await);
    }

    Ok(FeedPage {
        items,
        total_count,
        total_pages: total_pages(total_count),
    })
}

/// `max(1, ceil(total / page size))`; an empty result still has one page.
pub fn total_pages(total_count: usize) -> usize {
    total_count.div_ceil(PAGE_SIZE).max(1)
}

fn filter_by_title(text: &str, posts: Vec<Post>) -> Vec<Post> {
    let mut scored: Vec<(f64, Post)> = posts
        .into_iter()
        .filter_map(|post| {
            search::score(text, &post.title, search::DEFAULT_THRESHOLD)
                .map(|score| (score, post))
        })
        .collect();

    // Stable sort keeps the store's ordering for equally scored titles.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, post)| post).collect()
}

fn paginate(posts: Vec<Post>, offset: usize) -> Vec<Post> {
    posts.into_iter().skip(offset).take(PAGE_SIZE).collect()
}

async fn enrich<S: ForumStore>(store: &S, post: Post) -> PostView {
    let author = store
        .resolve_username(post.author_id)
        .await
        .unwrap_or_else(|_| UNKNOWN_USER.to_owned());
    let hashtags = store.resolve_hashtags(post.id).await.unwrap_or_default();
    let age = format_relative_age(post.created_at_unix_ms);

    PostView {
        post,
        author,
        hashtags,
        age,
    }
}
