//! Comment operations orchestrated over the store contract.
//!
//! Every operation re-checks document access first; the decision
//! functions themselves stay pure and are fed freshly loaded snapshots.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::academic::{Requester, SubjectAssignment, TerminalLevels, UserRole};
use crate::access::{can_access_document, can_moderate};
use crate::comments::thread::{assemble_thread, CommentNode};
use crate::comments::turn_taking::{can_reply_to_comment, ReplyGate, REASON_PARENT_NOT_FOUND};
use crate::database::models::{Comment, DocumentWithSubjects, NewCommentRow};
use crate::database::store::ArchiveStore;
use crate::error::CoreError;

/// One page of a document's comment thread.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThreadPage {
    pub comments: Vec<CommentNode>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    /// Whether the requester may moderate this thread; surfaced for UI
    /// affordance alongside the listing.
    pub can_moderate: bool,
}

pub struct CommentService<S> {
    store: S,
    terminal_levels: TerminalLevels,
}

impl<S: ArchiveStore> CommentService<S> {
    pub fn new(store: S, terminal_levels: TerminalLevels) -> Self {
        Self { store, terminal_levels }
    }

    async fn load_live_document(&self, id: Uuid) -> Result<DocumentWithSubjects, CoreError> {
        self.store
            .find_document(id)
            .await?
            .filter(|d| !d.document.is_deleted)
            .ok_or_else(|| CoreError::NotFound("document not found".into()))
    }

    /// Assignments covering the document's subjects, loaded only for
    /// professors; other roles never consult them.
    async fn assignments_for(
        &self,
        requester: &Requester,
        doc: &DocumentWithSubjects,
    ) -> Result<Vec<SubjectAssignment>, CoreError> {
        if requester.role != UserRole::Professor {
            return Ok(Vec::new());
        }
        let subject_ids = doc.subject_ids();
        if subject_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .find_subject_assignments(requester.id, &subject_ids)
            .await?)
    }

    async fn require_access(
        &self,
        doc: &DocumentWithSubjects,
        requester: &Requester,
    ) -> Result<Vec<SubjectAssignment>, CoreError> {
        let assignments = self.assignments_for(requester, doc).await?;
        if !can_access_document(doc, requester, &assignments, &self.terminal_levels) {
            return Err(CoreError::Forbidden(
                "you do not have access to this document".into(),
            ));
        }
        Ok(assignments)
    }

    /// Evaluate the turn-taking gate for a prospective reply without
    /// creating anything.
    pub async fn reply_gate(
        &self,
        parent_id: Uuid,
        requester: &Requester,
    ) -> Result<ReplyGate, CoreError> {
        // Staff short-circuit mirrors the protocol's first rule.
        if requester.role.is_staff() {
            return Ok(ReplyGate::allow());
        }
        match self.store.find_comment_with_replies(parent_id).await? {
            Some(parent) => {
                // No verdict without document access; an outsider must
                // not learn whether the comment exists or who wrote it.
                let doc = self.load_live_document(parent.comment.document_id).await?;
                self.require_access(&doc, requester).await?;
                Ok(can_reply_to_comment(
                    requester,
                    Some(&parent.comment),
                    &parent.replies,
                ))
            }
            None => Ok(ReplyGate::deny(REASON_PARENT_NOT_FOUND)),
        }
    }

    pub async fn create_comment(
        &self,
        document_id: Uuid,
        requester: &Requester,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, CoreError> {
        let doc = self.load_live_document(document_id).await?;
        self.require_access(&doc, requester).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::BadRequest("comment content cannot be empty".into()));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .store
                .find_comment_with_replies(parent_id)
                .await?
                .filter(|p| !p.comment.is_deleted)
                .ok_or_else(|| CoreError::NotFound("parent comment not found".into()))?;

            if parent.comment.document_id != doc.id() {
                return Err(CoreError::BadRequest(
                    "parent comment belongs to a different document".into(),
                ));
            }

            let gate = can_reply_to_comment(requester, Some(&parent.comment), &parent.replies);
            if !gate.can_reply {
                return Err(CoreError::Forbidden(
                    gate.reason.unwrap_or("reply not allowed").into(),
                ));
            }
        }

        let comment = self
            .store
            .insert_comment(NewCommentRow {
                document_id: doc.id(),
                author_id: requester.id,
                author_role: requester.role,
                parent_id,
                content: content.to_string(),
            })
            .await?;
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        id: Uuid,
        requester: &Requester,
        content: &str,
    ) -> Result<Comment, CoreError> {
        let comment = self
            .store
            .find_comment(id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| CoreError::NotFound("comment not found".into()))?;

        if !requester.is_admin() && requester.id != comment.author_id {
            return Err(CoreError::Forbidden(
                "only the author or an admin may edit a comment".into(),
            ));
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::BadRequest("comment content cannot be empty".into()));
        }

        // is_edited is set here and never reverts.
        Ok(self.store.update_comment_content(id, content).await?)
    }

    /// Soft-delete a comment and cascade to its direct replies.
    ///
    /// Authorized for the comment's author, admins, and resolved
    /// moderators of the parent document. Returns the number of
    /// comments stamped.
    pub async fn delete_comment(&self, id: Uuid, requester: &Requester) -> Result<u64, CoreError> {
        let comment = self
            .store
            .find_comment(id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| CoreError::NotFound("comment not found".into()))?;

        let doc = self.load_live_document(comment.document_id).await?;
        let assignments = self.require_access(&doc, requester).await?;

        let authorized = requester.is_admin()
            || comment.author_id == requester.id
            || can_moderate(&doc, requester, &assignments);
        if !authorized {
            return Err(CoreError::Forbidden(
                "not authorized to delete this comment".into(),
            ));
        }

        let stamped = self
            .store
            .soft_delete_comment_and_replies(id, requester.id, Utc::now())
            .await?;
        Ok(stamped)
    }

    pub async fn get_document_comments(
        &self,
        document_id: Uuid,
        requester: &Requester,
        page: i64,
        limit: i64,
    ) -> Result<CommentThreadPage, CoreError> {
        let doc = self.load_live_document(document_id).await?;
        let assignments = self.require_access(&doc, requester).await?;

        let page = page.max(1);
        let limit = limit.max(1);
        // Saturating: an absurd page number yields an empty page, not
        // an overflow or a negative offset.
        let offset = page.saturating_sub(1).saturating_mul(limit);

        let (roots, total) = self
            .store
            .list_top_level_comments(doc.id(), offset, limit)
            .await?;
        let descendants = self.store.list_reply_descendants(doc.id()).await?;

        Ok(CommentThreadPage {
            comments: assemble_thread(&roots, descendants),
            page,
            limit,
            total,
            can_moderate: can_moderate(&doc, requester, &assignments),
        })
    }
}
