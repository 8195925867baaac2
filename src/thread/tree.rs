//! Flat comment set to leveled reply forest.

use super::collapse::CollapseState;
use crate::domain::{Comment, CommentViewNode, UNKNOWN_USER};
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
struct BuildNode {
    comment: Comment,
    replies: Vec<u64>,
}

/// Assembles a flat comment collection into top-level view nodes with
/// replies nested inside.
///
/// Levels are a derived projection, not a stored fact: top-level comments
/// get level 1 regardless of what the store recorded, and every reply gets
/// its parent's level plus one. A reply whose parent is absent from the
/// loaded set is dropped rather than promoted to top level. Sibling order
/// follows the input collection. Trees persisted deeper than the creation
/// limit are rendered as-is; the depth cap is enforced at submission time.
///
/// `authors` maps user ids to display names; missing entries degrade to
/// [`UNKNOWN_USER`]. `drafts` carries pending reply input by comment id so
/// in-progress text survives a rebuild.
pub fn build_thread(
    comments: &[Comment],
    collapse: &CollapseState,
    authors: &HashMap<u64, String>,
    drafts: &HashMap<u64, String>,
) -> Vec<CommentViewNode> {
    let mut nodes: HashMap<u64, BuildNode> = HashMap::with_capacity(comments.len());
    let mut parent_links: Vec<(u64, Option<u64>)> = Vec::with_capacity(comments.len());

    for comment in comments {
        parent_links.push((comment.id, comment.parent_id));
        nodes.insert(
            comment.id,
            BuildNode {
                comment: comment.clone(),
                replies: Vec::new(),
            },
        );
    }

    let mut root_ids = Vec::new();
    for (id, parent_id) in parent_links {
        match parent_id {
            None => root_ids.push(id),
            Some(parent_id) => {
                if let Some(parent) = nodes.get_mut(&parent_id) {
                    parent.replies.push(id);
                }
                // Orphan replies are not promoted; manufacturing top-level
                // content out of a partial fetch is worse than hiding it.
            }
        }
    }

    root_ids
        .into_iter()
        .filter_map(|id| materialize(id, 1, &mut nodes, collapse, authors, drafts))
        .collect()
}

/// Recomputes the level of every reachable comment from the parent chain,
/// breadth-first. Orphan subtrees are absent from the result, mirroring
/// [`build_thread`].
pub fn computed_levels(comments: &[Comment]) -> HashMap<u64, u8> {
    let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
    let mut queue: VecDeque<(u64, u8)> = VecDeque::new();

    for comment in comments {
        match comment.parent_id {
            None => queue.push_back((comment.id, 1)),
            Some(parent_id) => children.entry(parent_id).or_default().push(comment.id),
        }
    }

    let mut levels = HashMap::with_capacity(comments.len());
    while let Some((id, level)) = queue.pop_front() {
        if levels.insert(id, level).is_some() {
            // A repeat visit means duplicate ids in the input.
            continue;
        }
        for &child_id in children.get(&id).into_iter().flatten() {
            queue.push_back((child_id, level.saturating_add(1)));
        }
    }

    levels
}

fn materialize(
    id: u64,
    level: u8,
    nodes: &mut HashMap<u64, BuildNode>,
    collapse: &CollapseState,
    authors: &HashMap<u64, String>,
    drafts: &HashMap<u64, String>,
) -> Option<CommentViewNode> {
    let node = nodes.remove(&id)?;
    let replies = node
        .replies
        .iter()
        .copied()
        .filter_map(|reply_id| {
            materialize(
                reply_id,
                level.saturating_add(1),
                nodes,
                collapse,
                authors,
                drafts,
            )
        })
        .collect();

    let mut comment = node.comment;
    comment.level = level;

    Some(CommentViewNode {
        author: authors
            .get(&comment.author_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_USER.to_owned()),
        expanded: !collapse.is_collapsed(comment.id),
        reply_draft: drafts.get(&comment.id).cloned().unwrap_or_default(),
        level,
        comment,
        replies,
    })
}
