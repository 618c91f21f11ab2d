//! Reply-tree assembly.
//!
//! Comments are fetched as a flat adjacency list keyed by document and
//! assembled in memory through a parent index, so reply depth is
//! unbounded rather than capped at a fixed nesting level.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::academic::UserRole;
use crate::database::models::Comment;

/// A rendered node of the reply tree.
///
/// Deleted comments that still have live descendants are kept as
/// redacted tombstones (no author, no content) so those descendants
/// stay reachable; deleted comments without live descendants are
/// dropped entirely.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_role: Option<UserRole>,
    pub content: Option<String>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn live(comment: &Comment, replies: Vec<CommentNode>) -> Self {
        Self {
            id: comment.id,
            author_id: Some(comment.author_id),
            author_role: Some(comment.author_role),
            content: Some(comment.content.clone()),
            is_edited: comment.is_edited,
            is_deleted: false,
            created_at: comment.created_at,
            replies,
        }
    }

    fn tombstone(comment: &Comment, replies: Vec<CommentNode>) -> Self {
        Self {
            id: comment.id,
            author_id: None,
            author_role: None,
            content: None,
            is_edited: false,
            is_deleted: true,
            created_at: comment.created_at,
            replies,
        }
    }
}

/// Assemble the reply forest for one page of top-level comments.
///
/// `top_level` keeps its incoming order (newest first from the store);
/// `descendants` is the document's full set of non-root comments in any
/// order. Each reply bucket is sorted oldest first.
pub fn assemble_thread(top_level: &[Comment], descendants: Vec<Comment>) -> Vec<CommentNode> {
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in descendants {
        if let Some(parent_id) = comment.parent_id {
            children.entry(parent_id).or_default().push(comment);
        }
    }
    for bucket in children.values_mut() {
        bucket.sort_by_key(|c| c.created_at);
    }

    top_level
        .iter()
        .filter_map(|root| build_node(root, &children))
        .collect()
}

fn build_node(comment: &Comment, children: &HashMap<Uuid, Vec<Comment>>) -> Option<CommentNode> {
    let replies: Vec<CommentNode> = children
        .get(&comment.id)
        .map(|bucket| bucket.iter().filter_map(|c| build_node(c, children)).collect())
        .unwrap_or_default();

    if comment.is_deleted {
        if replies.is_empty() {
            return None;
        }
        return Some(CommentNode::tombstone(comment, replies));
    }

    Some(CommentNode::live(comment, replies))
}
