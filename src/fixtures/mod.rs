//! In-memory store fixture for tests and demo sessions.

use crate::config::Limits;
use crate::domain::{Comment, Hashtag, Post};
use crate::store::{ForumStore, Result, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// A [`ForumStore`] backed by plain vectors.
///
/// Comments keep insertion order, which stands in for creation order. The
/// hashtag boundary behaves like the real store: names are interned
/// lower-cased, deduplicated, and matched case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    users: HashMap<u64, String>,
    hashtags: Vec<Hashtag>,
    post_hashtags: HashMap<u64, Vec<u64>>,
    fail_hashtag_lookups: HashSet<u64>,
    current_user: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.inner.lock().expect("store lock").current_user = 1;
        store
    }

    pub fn add_user(&self, id: u64, name: &str) {
        self.inner
            .lock()
            .expect("store lock")
            .users
            .insert(id, name.to_owned());
    }

    /// Sets the author id assigned to comments created through the store.
    pub fn set_current_user(&self, id: u64) {
        self.inner.lock().expect("store lock").current_user = id;
    }

    pub fn add_post(&self, post: Post, hashtags: &[&str]) {
        let mut inner = self.inner.lock().expect("store lock");
        let post_id = post.id;
        inner.posts.push(post);

        let limits = Limits::default();
        let mut attached = Vec::new();
        for name in hashtags {
            let name = name.to_lowercase();
            if !Hashtag::is_valid_name(&name, limits.hashtag_max) {
                continue;
            }
            let tag_id = inner.intern_hashtag(&name);
            if !attached.contains(&tag_id) {
                attached.push(tag_id);
            }
        }
        inner.post_hashtags.insert(post_id, attached);
    }

    pub fn add_comment(&self, comment: Comment) {
        self.inner.lock().expect("store lock").comments.push(comment);
    }

    /// Makes `resolve_hashtags` fail for one post, to exercise enrichment
    /// degradation.
    pub fn fail_hashtag_lookups_for(&self, post_id: u64) {
        self.inner
            .lock()
            .expect("store lock")
            .fail_hashtag_lookups
            .insert(post_id);
    }

    pub fn comment_count(&self) -> usize {
        self.inner.lock().expect("store lock").comments.len()
    }

    pub fn comment(&self, id: u64) -> Option<Comment> {
        self.inner
            .lock()
            .expect("store lock")
            .comments
            .iter()
            .find(|comment| comment.id == id)
            .cloned()
    }

    /// A small forum: three users, seven posts across three categories,
    /// and one threaded discussion on the borrow-checker post.
    pub fn demo_forum() -> Self {
        let store = Self::new();
        store.add_user(1, "hazel");
        store.add_user(2, "marten");
        store.add_user(3, "priya");

        let now = now_unix_ms();
        let hour = 3_600_000i64;
        let post = |id: u64, title: &str, author_id: u64, category_id: u64| Post {
            id,
            title: title.to_owned(),
            body: format!("{title} - full discussion inside."),
            author_id,
            category_id,
            created_at_unix_ms: now - (8 - id as i64) * hour,
            updated_at_unix_ms: now - (8 - id as i64) * hour,
            likes: id as u32,
        };

        store.add_post(
            post(1, "Understanding the borrow checker", 1, 1),
            &["rust"],
        );
        store.add_post(post(2, "Lifetime elision rules explained", 2, 1), &["rust"]);
        store.add_post(post(3, "Weekend hiking photos", 2, 2), &["outdoors"]);
        store.add_post(post(4, "Best coffee near the office", 3, 2), &[]);
        store.add_post(
            post(5, "Async executors compared", 1, 1),
            &["rust", "async"],
        );
        store.add_post(post(6, "Ghost thread without an author", 99, 3), &[]);
        store.add_post(post(7, "Community meetup recap", 3, 3), &["meetup"]);
        store.fail_hashtag_lookups_for(6);

        let comment = |id: u64, parent_id: Option<u64>, author_id: u64, body: &str| Comment {
            id,
            post_id: 1,
            parent_id,
            author_id,
            body: body.to_owned(),
            created_at_unix_ms: now - hour + id as i64 * 60_000,
            likes: 0,
            level: match parent_id {
                None => 1,
                Some(1) => 2,
                Some(_) => 3,
            },
        };

        store.add_comment(comment(1, None, 1, "The diagrams here finally made it click."));
        store.add_comment(comment(2, Some(1), 2, "Same, the second one especially."));
        store.add_comment(comment(3, Some(2), 3, "Bookmarking this whole thread."));
        store.add_comment(comment(4, None, 2, "Does this cover two-phase borrows?"));
        store.add_comment(comment(5, Some(1), 99, "Posting from a deleted account."));

        store
    }
}

impl Inner {
    fn intern_hashtag(&mut self, name: &str) -> u64 {
        if let Some(existing) = self.hashtags.iter().find(|tag| tag.name == name) {
            return existing.id;
        }
        let id = self.hashtags.len() as u64 + 1;
        self.hashtags.push(Hashtag {
            id,
            name: name.to_owned(),
        });
        id
    }

    fn hashtag_names(&self, post_id: u64) -> Vec<String> {
        self.post_hashtags
            .get(&post_id)
            .into_iter()
            .flatten()
            .filter_map(|tag_id| {
                self.hashtags
                    .iter()
                    .find(|tag| tag.id == *tag_id)
                    .map(|tag| tag.name.clone())
            })
            .collect()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by_key(|post| std::cmp::Reverse(post.created_at_unix_ms));
    posts
}

impl ForumStore for MemoryStore {
    async fn fetch_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        post_id: u64,
        parent_id: Option<u64>,
        body: &str,
    ) -> Result<u64> {
        let mut inner = self.inner.lock().expect("store lock");

        if !inner.posts.iter().any(|post| post.id == post_id) {
            return Err(StoreError::NotFound {
                entity: "post",
                id: post_id,
            });
        }

        let parent_level = match parent_id {
            None => 0,
            Some(parent_id) => {
                let parent = inner
                    .comments
                    .iter()
                    .find(|comment| comment.id == parent_id)
                    .ok_or(StoreError::NotFound {
                        entity: "comment",
                        id: parent_id,
                    })?;
                parent.level
            }
        };

        let id = inner
            .comments
            .iter()
            .map(|comment| comment.id)
            .max()
            .unwrap_or(0)
            + 1;
        let author_id = inner.current_user;
        inner.comments.push(Comment {
            id,
            post_id,
            parent_id,
            author_id,
            body: body.to_owned(),
            created_at_unix_ms: now_unix_ms(),
            likes: 0,
            level: parent_level + 1,
        });

        Ok(id)
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock");
        if !inner.comments.iter().any(|comment| comment.id == comment_id) {
            return Err(StoreError::NotFound {
                entity: "comment",
                id: comment_id,
            });
        }

        let mut doomed: HashSet<u64> = HashSet::from([comment_id]);
        loop {
            let before = doomed.len();
            for comment in &inner.comments {
                if let Some(parent_id) = comment.parent_id {
                    if doomed.contains(&parent_id) {
                        doomed.insert(comment.id);
                    }
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        inner.comments.retain(|comment| !doomed.contains(&comment.id));
        Ok(())
    }

    async fn fetch_posts_page(&self, offset: usize, limit: usize) -> Result<(Vec<Post>, usize)> {
        let inner = self.inner.lock().expect("store lock");
        let posts = newest_first(inner.posts.clone());
        let total = posts.len();
        Ok((posts.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn fetch_posts_all(&self) -> Result<Vec<Post>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(newest_first(inner.posts.clone()))
    }

    async fn fetch_posts_by_category(
        &self,
        category_id: u64,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Post>, usize)> {
        let posts = self.fetch_posts_by_category_all(category_id).await?;
        let total = posts.len();
        Ok((posts.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn fetch_posts_by_category_all(&self, category_id: u64) -> Result<Vec<Post>> {
        let inner = self.inner.lock().expect("store lock");
        let posts = inner
            .posts
            .iter()
            .filter(|post| post.category_id == category_id)
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn fetch_posts_by_hashtags(
        &self,
        hashtags: &[String],
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Post>, usize)> {
        let inner = self.inner.lock().expect("store lock");
        let wanted: Vec<String> = hashtags.iter().map(|tag| tag.to_lowercase()).collect();

        let matches: Vec<Post> = inner
            .posts
            .iter()
            .filter(|post| {
                let names = inner.hashtag_names(post.id);
                wanted.iter().all(|tag| names.contains(tag))
            })
            .cloned()
            .collect();

        let matches = newest_first(matches);
        let total = matches.len();
        Ok((matches.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn resolve_username(&self, user_id: u64) -> Result<String> {
        self.inner
            .lock()
            .expect("store lock")
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "user",
                id: user_id,
            })
    }

    async fn resolve_hashtags(&self, post_id: u64) -> Result<Vec<String>> {
        let inner = self.inner.lock().expect("store lock");
        if inner.fail_hashtag_lookups.contains(&post_id) {
            return Err(StoreError::Backend {
                operation: "resolve_hashtags",
                id: post_id,
                message: "join table unavailable".to_owned(),
            });
        }
        Ok(inner.hashtag_names(post_id))
    }
}

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or_default()
}
