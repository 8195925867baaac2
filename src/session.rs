//! View-layer facade over the presentation core.
//!
//! A [`Session`] owns one user's UI-visible state: collapse flags, reply
//! drafts, the duplicate-submission guard, and a snapshot of the currently
//! open thread. Nothing here is process-global, so independent sessions
//! (and tests) never interfere.

use crate::config::Limits;
use crate::domain::{Comment, CommentViewNode, MAX_DEPTH};
use crate::feed::{FeedError, FeedPage, FeedQuery, query_feed};
use crate::search;
use crate::store::{ForumStore, StoreError};
use crate::thread::{
    CollapseState, SubmissionGuard, SubmitError, SubmitOutcome, build_thread, computed_levels,
};
use std::collections::HashMap;

#[derive(Debug)]
struct LoadedThread {
    post_id: u64,
    comments: Vec<Comment>,
    authors: HashMap<u64, String>,
}

/// One user's forum session.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    limits: Limits,
    collapse: CollapseState,
    guard: SubmissionGuard,
    drafts: HashMap<u64, String>,
    thread: Option<LoadedThread>,
}

impl<S: ForumStore> Session<S> {
    pub fn new(store: S, limits: Limits) -> Self {
        Self {
            store,
            limits,
            collapse: CollapseState::new(),
            guard: SubmissionGuard::new(),
            drafts: HashMap::new(),
            thread: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches a post's comments and builds its reply forest.
    ///
    /// Author names are resolved once per distinct author; a failed lookup
    /// leaves that author to the placeholder, it never fails the load.
    /// Opening a different post clears reply drafts and the submission
    /// guard; reloading the same post keeps both, and collapse state is
    /// kept either way.
    pub async fn load_thread(&mut self, post_id: u64) -> Result<Vec<CommentViewNode>, StoreError> {
        let comments = self.store.fetch_comments(post_id).await?;

        if self.thread.as_ref().is_some_and(|t| t.post_id != post_id) {
            self.drafts.clear();
            self.guard.reset();
        }

        let mut authors = HashMap::new();
        for comment in &comments {
            if authors.contains_key(&comment.author_id) {
                continue;
            }
            if let Ok(name) = self.store.resolve_username(comment.author_id).await {
                authors.insert(comment.author_id, name);
            }
        }

        self.thread = Some(LoadedThread {
            post_id,
            comments,
            authors,
        });
        Ok(self.rebuild_thread())
    }

    /// Rebuilds the forest from the cached snapshot, without refetching.
    /// Returns an empty forest when no thread is loaded.
    pub fn rebuild_thread(&self) -> Vec<CommentViewNode> {
        match &self.thread {
            Some(thread) => build_thread(
                &thread.comments,
                &self.collapse,
                &thread.authors,
                &self.drafts,
            ),
            None => Vec::new(),
        }
    }

    /// Flips one comment's collapse flag. Takes effect on the next rebuild.
    pub fn toggle(&mut self, comment_id: u64) {
        self.collapse.toggle(comment_id);
    }

    pub fn set_reply_draft(&mut self, comment_id: u64, body: impl Into<String>) {
        self.drafts.insert(comment_id, body.into());
    }

    pub fn clear_reply_draft(&mut self, comment_id: u64) {
        self.drafts.remove(&comment_id);
    }

    /// Submits a top-level comment (`parent_id == None`) or a reply.
    ///
    /// Order of checks: body validation, duplicate suppression, parent
    /// presence, nesting depth, then the store write. Validation always
    /// precedes any mutation, and the depth check runs exactly once, here.
    pub async fn submit_reply(
        &mut self,
        parent_id: Option<u64>,
        body: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        if body.trim().is_empty() {
            return Err(SubmitError::EmptyBody);
        }
        if body.chars().count() > self.limits.comment_body_max {
            return Err(SubmitError::BodyTooLong {
                limit: self.limits.comment_body_max,
            });
        }

        let thread = self.thread.as_ref().ok_or(SubmitError::NoThread)?;

        if self.guard.should_suppress(parent_id, body, &thread.comments) {
            return Ok(SubmitOutcome::Suppressed);
        }

        if let Some(parent_id) = parent_id {
            let levels = computed_levels(&thread.comments);
            let parent_level = levels
                .get(&parent_id)
                .copied()
                .ok_or(SubmitError::ParentNotFound(parent_id))?;
            if parent_level >= MAX_DEPTH {
                return Err(SubmitError::NestingLimit { limit: MAX_DEPTH });
            }
        }

        let id = self
            .store
            .create_comment(thread.post_id, parent_id, body)
            .await?;

        self.guard.record_attempt(parent_id, body);
        if let Some(parent_id) = parent_id {
            self.drafts.remove(&parent_id);
        }

        Ok(SubmitOutcome::Accepted { id })
    }

    /// Deletes a comment and its descendants, then drops local state for it.
    pub async fn delete_comment(&mut self, comment_id: u64) -> Result<(), StoreError> {
        self.store.delete_comment(comment_id).await?;
        self.drafts.remove(&comment_id);
        Ok(())
    }

    /// Resolves one feed page.
    pub async fn query_feed(&self, query: &FeedQuery) -> Result<FeedPage, FeedError> {
        query_feed(&self.store, query).await
    }

    /// Fuzzy-ranks candidate strings against a query at the default
    /// threshold; [`search::rank`] takes an explicit one.
    pub fn search(&self, query: &str, candidates: &[String]) -> Vec<String> {
        search::rank(query, candidates, search::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::config::Limits;
    use crate::domain::{Comment, MAX_DEPTH, UNKNOWN_USER};
    use crate::fixtures::MemoryStore;
    use crate::thread::{SubmitError, SubmitOutcome};

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::demo_forum(), Limits::default())
    }

    fn deep_chain_store(depth: u8) -> MemoryStore {
        let store = MemoryStore::demo_forum();
        for level in 1..=depth {
            store.add_comment(Comment {
                id: 100 + level as u64,
                post_id: 2,
                parent_id: (level > 1).then(|| 99 + level as u64),
                author_id: 1,
                body: format!("chain level {level}"),
                created_at_unix_ms: level as i64,
                likes: 0,
                level,
            });
        }
        store
    }

    #[tokio::test]
    async fn load_thread_builds_the_forest_with_resolved_authors() {
        let mut session = session();
        let forest = session.load_thread(1).await.unwrap();

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].author, "hazel");
        assert_eq!(forest[0].replies.len(), 2);
        // Author 99 has no user row.
        assert_eq!(forest[0].replies[1].author, UNKNOWN_USER);
    }

    #[tokio::test]
    async fn collapse_survives_a_fresh_reload_of_the_same_post() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        session.toggle(1);
        let reloaded = session.load_thread(1).await.unwrap();
        assert!(!reloaded[0].expanded);

        session.toggle(1);
        assert!(session.rebuild_thread()[0].expanded);
    }

    #[tokio::test]
    async fn double_submit_creates_exactly_one_comment() {
        let mut session = session();
        session.load_thread(1).await.unwrap();
        let before = session.store().comment_count();

        let first = session.submit_reply(Some(4), "replying once").await.unwrap();
        assert!(matches!(first, SubmitOutcome::Accepted { .. }));

        let second = session.submit_reply(Some(4), "replying once").await.unwrap();
        assert_eq!(second, SubmitOutcome::Suppressed);

        assert_eq!(session.store().comment_count(), before + 1);
    }

    #[tokio::test]
    async fn a_loaded_duplicate_is_suppressed_after_reload() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        // Body already present under parent 1 in the demo thread, with
        // different casing.
        let outcome = session
            .submit_reply(Some(1), "SAME, the second one especially.")
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Suppressed);
    }

    #[tokio::test]
    async fn top_level_submissions_are_allowed_and_guarded() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        let first = session.submit_reply(None, "a fresh take").await.unwrap();
        assert!(matches!(first, SubmitOutcome::Accepted { .. }));
        let second = session.submit_reply(None, "a fresh take").await.unwrap();
        assert_eq!(second, SubmitOutcome::Suppressed);
    }

    #[tokio::test]
    async fn submit_without_a_loaded_thread_is_rejected() {
        let mut session = session();
        let result = session.submit_reply(None, "hello").await;
        assert!(matches!(result, Err(SubmitError::NoThread)));
    }

    #[tokio::test]
    async fn empty_and_oversized_bodies_are_rejected_before_any_write() {
        let mut session = session();
        session.load_thread(1).await.unwrap();
        let before = session.store().comment_count();

        assert!(matches!(
            session.submit_reply(None, "   ").await,
            Err(SubmitError::EmptyBody)
        ));
        let oversized = "x".repeat(Limits::default().comment_body_max + 1);
        assert!(matches!(
            session.submit_reply(None, &oversized).await,
            Err(SubmitError::BodyTooLong { .. })
        ));
        assert_eq!(session.store().comment_count(), before);
    }

    #[tokio::test]
    async fn replying_to_an_unknown_parent_is_rejected() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        let result = session.submit_reply(Some(999), "hello?").await;
        assert!(matches!(result, Err(SubmitError::ParentNotFound(999))));
    }

    #[tokio::test]
    async fn replying_below_the_depth_cap_is_rejected() {
        let store = deep_chain_store(MAX_DEPTH);
        let mut session = Session::new(store, Limits::default());
        session.load_thread(2).await.unwrap();

        // The deepest chain comment sits at the cap; one at the level above
        // may still take replies.
        let at_cap = session
            .submit_reply(Some(100 + MAX_DEPTH as u64), "too deep")
            .await;
        assert!(matches!(
            at_cap,
            Err(SubmitError::NestingLimit { limit: MAX_DEPTH })
        ));

        let above_cap = session
            .submit_reply(Some(99 + MAX_DEPTH as u64), "fits")
            .await
            .unwrap();
        assert!(matches!(above_cap, SubmitOutcome::Accepted { .. }));
    }

    #[tokio::test]
    async fn depth_is_checked_against_recomputed_levels_not_stored_ones() {
        let store = MemoryStore::demo_forum();
        // Stored level lies: claims the cap, but the comment is top-level.
        store.add_comment(Comment {
            id: 50,
            post_id: 2,
            parent_id: None,
            author_id: 1,
            body: "mislabeled".to_owned(),
            created_at_unix_ms: 0,
            likes: 0,
            level: MAX_DEPTH,
        });

        let mut session = Session::new(store, Limits::default());
        session.load_thread(2).await.unwrap();

        let outcome = session.submit_reply(Some(50), "still fine").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted { .. }));
    }

    #[tokio::test]
    async fn switching_posts_clears_drafts_and_the_guard() {
        let mut session = session();
        session.load_thread(1).await.unwrap();
        session.set_reply_draft(1, "unsent reply");
        session.submit_reply(Some(4), "carried signature").await.unwrap();

        session.load_thread(2).await.unwrap();
        session.load_thread(1).await.unwrap();

        assert_eq!(session.rebuild_thread()[0].reply_draft, "");
        // The guard forgot the signature; only the loaded-duplicate check
        // remains, and it still catches the resubmission.
        let outcome = session.submit_reply(Some(4), "carried signature").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Suppressed);
    }

    #[tokio::test]
    async fn a_successful_reply_clears_the_parents_draft() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        session.set_reply_draft(4, "work in progress");
        assert_eq!(session.rebuild_thread()[1].reply_draft, "work in progress");

        session.submit_reply(Some(4), "work in progress, done").await.unwrap();
        assert_eq!(session.rebuild_thread()[1].reply_draft, "");
    }

    #[tokio::test]
    async fn drafts_can_be_cleared_without_submitting() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        session.set_reply_draft(1, "on second thought");
        session.clear_reply_draft(1);
        assert_eq!(session.rebuild_thread()[0].reply_draft, "");
    }

    #[tokio::test]
    async fn delete_comment_removes_the_subtree_from_the_next_load() {
        let mut session = session();
        session.load_thread(1).await.unwrap();

        session.delete_comment(2).await.unwrap();
        let forest = session.load_thread(1).await.unwrap();

        // Comment 2 and its reply 3 are gone; reply 5 remains under root 1.
        assert_eq!(forest[0].replies.len(), 1);
        assert_eq!(forest[0].replies[0].comment.id, 5);
    }

    #[tokio::test]
    async fn search_delegates_to_the_tiered_matcher() {
        let session = session();
        let candidates = vec![
            "category".to_owned(),
            "dog".to_owned(),
            "concatenate".to_owned(),
        ];
        assert_eq!(
            session.search("cat", &candidates),
            vec!["category", "concatenate"]
        );
    }
}
