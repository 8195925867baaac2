//! Per-comment expand/collapse state.
//!
//! Session-scoped rather than process-global so independent sessions and
//! tests never observe each other. Entries outlive any single tree build;
//! rebuilding a thread from a fresh fetch reproduces the same collapsed
//! nodes. Comment ids are globally unique, so one map covers every post.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashSet<u64>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default is expanded.
    pub fn is_collapsed(&self, comment_id: u64) -> bool {
        self.collapsed.contains(&comment_id)
    }

    pub fn set_collapsed(&mut self, comment_id: u64, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(comment_id);
        } else {
            self.collapsed.remove(&comment_id);
        }
    }

    pub fn toggle(&mut self, comment_id: u64) {
        if !self.collapsed.remove(&comment_id) {
            self.collapsed.insert(comment_id);
        }
    }
}
