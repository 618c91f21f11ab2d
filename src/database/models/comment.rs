use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::academic::UserRole;

/// A node in a document's comment tree.
///
/// `parent_id` always references a comment of the same document.
/// Comments are never hard-deleted; soft-deleted rows are kept for audit
/// and excluded from permission decisions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub document_id: Uuid,
    pub author_id: Uuid,
    /// Author's role at creation time; turn-taking reads this, not the
    /// author's current role.
    pub author_role: UserRole,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment together with its direct replies, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithReplies {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Insert shape for a new comment.
#[derive(Debug, Clone)]
pub struct NewCommentRow {
    pub document_id: Uuid,
    pub author_id: Uuid,
    pub author_role: UserRole,
    pub parent_id: Option<Uuid>,
    pub content: String,
}
