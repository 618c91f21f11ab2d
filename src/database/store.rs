//! Query contract the document and comment services consume.
//!
//! The engines never touch SQL; they are handed snapshots loaded through
//! this trait. `PgStore` is the production implementation; the test
//! suite uses an in-memory store with the same semantics, including the
//! `(subject_id, role)` assignment uniqueness.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::academic::{AssignmentRole, SubjectAssignment, SubjectRef};
use crate::database::models::{Comment, CommentWithReplies, DocumentWithSubjects, NewCommentRow};
use crate::documents::{DocumentFilter, DocumentUpdate, NewDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// Backend failure; never surfaced verbatim to clients.
    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait ArchiveStore: Send + Sync {
    // --- documents ---

    /// Load a document with its resolved subjects (legacy single-subject
    /// column merged with the join table). Includes soft-deleted rows;
    /// callers decide visibility.
    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentWithSubjects>, StoreError>;

    async fn list_documents(
        &self,
        filter: &DocumentFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<DocumentWithSubjects>, i64), StoreError>;

    async fn insert_document(
        &self,
        owner_id: Uuid,
        new: &NewDocument,
    ) -> Result<DocumentWithSubjects, StoreError>;

    async fn update_document(&self, id: Uuid, patch: &DocumentUpdate) -> Result<(), StoreError>;

    async fn soft_delete_document(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Clear the soft-delete stamp. Returns false when the document does
    /// not exist or is not deleted.
    async fn restore_document(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Bump and return the view counter.
    async fn increment_view_count(&self, id: Uuid) -> Result<i64, StoreError>;

    // --- academic hierarchy ---

    /// Resolve subjects to their track/level access view. Unknown ids
    /// are silently absent from the result.
    async fn find_subject_refs(&self, subject_ids: &[i32]) -> Result<Vec<SubjectRef>, StoreError>;

    async fn find_subject_assignments(
        &self,
        professor_id: Uuid,
        subject_ids: &[i32],
    ) -> Result<Vec<SubjectAssignment>, StoreError>;

    /// Bind a professor to a `(subject, role)` slot. Fails with
    /// `Conflict` when the slot is already taken; a unique index backs
    /// the check against concurrent writers.
    async fn assign_professor(&self, assignment: SubjectAssignment) -> Result<(), StoreError>;

    /// Free a `(subject, role)` slot. Returns false when it was empty.
    async fn unassign_professor(
        &self,
        subject_id: i32,
        role: AssignmentRole,
    ) -> Result<bool, StoreError>;

    // --- comments ---

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// A comment with its direct replies (one level), oldest first.
    /// Deleted replies are included; the decision functions filter them.
    async fn find_comment_with_replies(
        &self,
        id: Uuid,
    ) -> Result<Option<CommentWithReplies>, StoreError>;

    /// Non-deleted top-level comments, newest first, with the total count.
    async fn list_top_level_comments(
        &self,
        document_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Comment>, i64), StoreError>;

    /// Every non-root comment of the document, for in-memory tree
    /// assembly (adjacency list, no depth cap).
    async fn list_reply_descendants(&self, document_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    async fn insert_comment(&self, new: NewCommentRow) -> Result<Comment, StoreError>;

    async fn update_comment_content(&self, id: Uuid, content: &str)
        -> Result<Comment, StoreError>;

    /// Soft-delete a comment and its direct replies in one transaction,
    /// all rows stamped with the same `deleted_at`/`deleted_by`. Deeper
    /// descendants are left untouched. Returns the number of rows
    /// stamped.
    async fn soft_delete_comment_and_replies(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
