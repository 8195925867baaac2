//! Duplicate suppression and outcome types for reply submission.

use crate::domain::Comment;
use crate::store::StoreError;
use thiserror::Error;

/// Result of a submission attempt that did not error.
///
/// Suppression is a normal outcome, kept separate from [`SubmitOutcome::Accepted`]
/// so the caller never shows a "posted" confirmation for a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { id: u64 },
    Suppressed,
}

/// Errors for comment and reply submission. Validation failures surface
/// before any mutation is attempted.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("comment body is empty")]
    EmptyBody,
    #[error("comment body exceeds {limit} characters")]
    BodyTooLong { limit: usize },
    #[error("no thread is loaded")]
    NoThread,
    #[error("parent comment {0} is not in the loaded thread")]
    ParentNotFound(u64),
    #[error("replies may not nest deeper than {limit} levels")]
    NestingLimit { limit: u8 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Heuristic duplicate-submission suppressor.
///
/// Two signals, either suffices: the `(parent, body)` signature equals the
/// most recently recorded attempt (a double-fired UI action), or the loaded
/// thread already holds a comment with the same parent and case-insensitively
/// equal body (a resubmission after reload). Not a strong idempotency key;
/// concurrent writers on other sessions are out of scope.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    last_signature: Option<(Option<u64>, String)>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_suppress(
        &self,
        parent_id: Option<u64>,
        body: &str,
        loaded: &[Comment],
    ) -> bool {
        let repeats_last = self
            .last_signature
            .as_ref()
            .is_some_and(|(last_parent, last_body)| {
                *last_parent == parent_id && last_body == body
            });
        if repeats_last {
            return true;
        }

        loaded.iter().any(|comment| {
            comment.parent_id == parent_id && comment.body.eq_ignore_ascii_case(body)
        })
    }

    pub fn record_attempt(&mut self, parent_id: Option<u64>, body: &str) {
        self.last_signature = Some((parent_id, body.to_owned()));
    }

    /// Clears the last-attempt signature, e.g. when switching threads.
    pub fn reset(&mut self) {
        self.last_signature = None;
    }
}
