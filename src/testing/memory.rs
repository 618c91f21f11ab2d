//! In-memory `ArchiveStore` for unit tests.
//!
//! Mirrors the Postgres store's semantics, including the
//! `(subject_id, role)` assignment uniqueness and the one-level comment
//! delete cascade. Timestamps come from a logical clock so ordering in
//! turn-taking tests is deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::academic::{AssignmentRole, SubjectAssignment, SubjectRef};
use crate::database::models::{
    Comment, CommentWithReplies, Document, DocumentCategory, DocumentWithSubjects, NewCommentRow,
};
use crate::database::store::{ArchiveStore, StoreError};
use crate::documents::{DeletedFilter, DocumentFilter, DocumentUpdate, NewDocument};
use crate::testing::fixtures::base_time;

#[derive(Default)]
struct State {
    subjects: HashMap<i32, SubjectRef>,
    assignments: Vec<SubjectAssignment>,
    documents: HashMap<Uuid, Document>,
    document_subjects: HashMap<Uuid, Vec<i32>>,
    comments: HashMap<Uuid, Comment>,
}

#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    clock: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Strictly increasing timestamps, one second apart.
    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst);
        base_time() + Duration::seconds(n)
    }

    // --- fixture helpers ---

    pub fn add_subject(&self, id: i32, track_id: i32, level_id: i32) {
        let mut state = self.state.write().unwrap();
        state.subjects.insert(id, SubjectRef { id, track_id, level_id });
    }

    pub fn add_assignment(&self, professor_id: Uuid, subject_id: i32, role: AssignmentRole) {
        let mut state = self.state.write().unwrap();
        state
            .assignments
            .push(SubjectAssignment { professor_id, subject_id, role });
    }

    pub fn add_document(&self, category: DocumentCategory, owner_id: Uuid, subjects: &[i32]) -> Uuid {
        let at = self.tick();
        let id = Uuid::new_v4();
        let mut state = self.state.write().unwrap();
        state.documents.insert(
            id,
            Document {
                id,
                title: "seeded document".into(),
                category,
                owner_id,
                subject_id: None,
                file_path: None,
                view_count: 0,
                is_deleted: false,
                deleted_at: None,
                deleted_by: None,
                created_at: at,
                updated_at: at,
            },
        );
        state.document_subjects.insert(id, subjects.to_vec());
        id
    }

    pub fn mark_document_deleted(&self, id: Uuid, by: Uuid) {
        let at = self.tick();
        let mut state = self.state.write().unwrap();
        if let Some(doc) = state.documents.get_mut(&id) {
            doc.is_deleted = true;
            doc.deleted_at = Some(at);
            doc.deleted_by = Some(by);
        }
    }

    // --- inspection helpers ---

    pub fn document(&self, id: Uuid) -> Option<Document> {
        self.state.read().unwrap().documents.get(&id).cloned()
    }

    pub fn comment(&self, id: Uuid) -> Option<Comment> {
        self.state.read().unwrap().comments.get(&id).cloned()
    }

    fn hydrate(&self, state: &State, doc: &Document) -> DocumentWithSubjects {
        let mut ids: Vec<i32> = state
            .document_subjects
            .get(&doc.id)
            .cloned()
            .unwrap_or_default();
        if let Some(legacy) = doc.subject_id {
            if !ids.contains(&legacy) {
                ids.push(legacy);
            }
        }
        let subjects = ids
            .iter()
            .filter_map(|id| state.subjects.get(id).copied())
            .collect();
        DocumentWithSubjects { document: doc.clone(), subjects }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn find_document(&self, id: Uuid) -> Result<Option<DocumentWithSubjects>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.documents.get(&id).map(|d| self.hydrate(&state, d)))
    }

    async fn list_documents(
        &self,
        filter: &DocumentFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<DocumentWithSubjects>, i64), StoreError> {
        let state = self.state.read().unwrap();
        let mut matching: Vec<DocumentWithSubjects> = state
            .documents
            .values()
            .filter(|d| match filter.deleted {
                DeletedFilter::Exclude => !d.is_deleted,
                DeletedFilter::Include => true,
                DeletedFilter::Only => d.is_deleted,
            })
            .filter(|d| filter.category.map_or(true, |c| d.category == c))
            .filter(|d| {
                filter.search.as_deref().map_or(true, |needle| {
                    d.title.to_lowercase().contains(&needle.to_lowercase())
                })
            })
            .map(|d| self.hydrate(&state, d))
            .filter(|d| {
                filter
                    .subject_id
                    .map_or(true, |s| d.subjects.iter().any(|r| r.id == s))
            })
            .collect();
        matching.sort_by(|a, b| b.document.created_at.cmp(&a.document.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert_document(
        &self,
        owner_id: Uuid,
        new: &NewDocument,
    ) -> Result<DocumentWithSubjects, StoreError> {
        let at = self.tick();
        let id = Uuid::new_v4();
        let mut state = self.state.write().unwrap();
        for subject_id in &new.subject_ids {
            if !state.subjects.contains_key(subject_id) {
                return Err(StoreError::Backend(format!("unknown subject {subject_id}")));
            }
        }
        let doc = Document {
            id,
            title: new.title.trim().to_string(),
            category: new.category,
            owner_id,
            subject_id: None,
            file_path: new.file_path.clone(),
            view_count: 0,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: at,
            updated_at: at,
        };
        state.documents.insert(id, doc.clone());
        state.document_subjects.insert(id, new.subject_ids.clone());
        Ok(self.hydrate(&state, &doc))
    }

    async fn update_document(&self, id: Uuid, patch: &DocumentUpdate) -> Result<(), StoreError> {
        let at = self.tick();
        let mut state = self.state.write().unwrap();
        if let Some(subject_ids) = &patch.subject_ids {
            state.document_subjects.insert(id, subject_ids.clone());
        }
        let doc = state
            .documents
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend("document not found".into()))?;
        if let Some(title) = &patch.title {
            doc.title = title.trim().to_string();
        }
        if let Some(file_path) = &patch.file_path {
            doc.file_path = Some(file_path.clone());
        }
        doc.updated_at = at;
        Ok(())
    }

    async fn soft_delete_document(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let doc = state
            .documents
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend("document not found".into()))?;
        doc.is_deleted = true;
        doc.deleted_at = Some(deleted_at);
        doc.deleted_by = Some(deleted_by);
        Ok(())
    }

    async fn restore_document(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().unwrap();
        match state.documents.get_mut(&id) {
            Some(doc) if doc.is_deleted => {
                doc.is_deleted = false;
                doc.deleted_at = None;
                doc.deleted_by = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<i64, StoreError> {
        let mut state = self.state.write().unwrap();
        let doc = state
            .documents
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend("document not found".into()))?;
        doc.view_count += 1;
        Ok(doc.view_count)
    }

    async fn find_subject_refs(&self, subject_ids: &[i32]) -> Result<Vec<SubjectRef>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(subject_ids
            .iter()
            .filter_map(|id| state.subjects.get(id).copied())
            .collect())
    }

    async fn find_subject_assignments(
        &self,
        professor_id: Uuid,
        subject_ids: &[i32],
    ) -> Result<Vec<SubjectAssignment>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.professor_id == professor_id && subject_ids.contains(&a.subject_id))
            .copied()
            .collect())
    }

    async fn assign_professor(&self, assignment: SubjectAssignment) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let taken = state
            .assignments
            .iter()
            .any(|a| a.subject_id == assignment.subject_id && a.role == assignment.role);
        if taken {
            return Err(StoreError::Conflict(format!(
                "subject {} already has a {:?} professor",
                assignment.subject_id, assignment.role
            )));
        }
        state.assignments.push(assignment);
        Ok(())
    }

    async fn unassign_professor(
        &self,
        subject_id: i32,
        role: AssignmentRole,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().unwrap();
        let before = state.assignments.len();
        state
            .assignments
            .retain(|a| !(a.subject_id == subject_id && a.role == role));
        Ok(state.assignments.len() != before)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.state.read().unwrap().comments.get(&id).cloned())
    }

    async fn find_comment_with_replies(
        &self,
        id: Uuid,
    ) -> Result<Option<CommentWithReplies>, StoreError> {
        let state = self.state.read().unwrap();
        let Some(comment) = state.comments.get(&id).cloned() else {
            return Ok(None);
        };
        let mut replies: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.parent_id == Some(id))
            .cloned()
            .collect();
        replies.sort_by_key(|c| c.created_at);
        Ok(Some(CommentWithReplies { comment, replies }))
    }

    async fn list_top_level_comments(
        &self,
        document_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Comment>, i64), StoreError> {
        let state = self.state.read().unwrap();
        let mut roots: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.document_id == document_id && c.parent_id.is_none() && !c.is_deleted)
            .cloned()
            .collect();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = roots.len() as i64;
        let page = roots
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_reply_descendants(&self, document_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .comments
            .values()
            .filter(|c| c.document_id == document_id && c.parent_id.is_some())
            .cloned()
            .collect())
    }

    async fn insert_comment(&self, new: NewCommentRow) -> Result<Comment, StoreError> {
        let at = self.tick();
        let comment = Comment {
            id: Uuid::new_v4(),
            document_id: new.document_id,
            author_id: new.author_id,
            author_role: new.author_role,
            parent_id: new.parent_id,
            content: new.content,
            is_edited: false,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: at,
            updated_at: at,
        };
        self.state
            .write()
            .unwrap()
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let at = self.tick();
        let mut state = self.state.write().unwrap();
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend("comment not found".into()))?;
        comment.content = content.to_string();
        comment.is_edited = true;
        comment.updated_at = at;
        Ok(comment.clone())
    }

    async fn soft_delete_comment_and_replies(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().unwrap();
        let mut stamped = 0;
        for comment in state.comments.values_mut() {
            let targeted = comment.id == id || comment.parent_id == Some(id);
            if targeted && !comment.is_deleted {
                comment.is_deleted = true;
                comment.deleted_at = Some(deleted_at);
                comment.deleted_by = Some(deleted_by);
                stamped += 1;
            }
        }
        Ok(stamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::professor;

    #[tokio::test]
    async fn assignment_slot_is_unique_per_subject_and_role() {
        let store = MemoryStore::new();
        store.add_subject(1, 1, 1);

        let x = professor();
        let y = professor();

        store
            .assign_professor(SubjectAssignment {
                professor_id: x.id,
                subject_id: 1,
                role: AssignmentRole::Lecture,
            })
            .await
            .unwrap();

        // Second professor into the same (subject, role) slot: rejected.
        let err = store
            .assign_professor(SubjectAssignment {
                professor_id: y.id,
                subject_id: 1,
                role: AssignmentRole::Lecture,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // A different role on the same subject is a separate slot.
        store
            .assign_professor(SubjectAssignment {
                professor_id: y.id,
                subject_id: 1,
                role: AssignmentRole::Tutorial,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unassign_frees_the_slot() {
        let store = MemoryStore::new();
        store.add_subject(1, 1, 1);
        let x = professor();
        store
            .assign_professor(SubjectAssignment {
                professor_id: x.id,
                subject_id: 1,
                role: AssignmentRole::Lab,
            })
            .await
            .unwrap();

        assert!(store.unassign_professor(1, AssignmentRole::Lab).await.unwrap());
        assert!(!store.unassign_professor(1, AssignmentRole::Lab).await.unwrap());

        // Slot is assignable again after release.
        let y = professor();
        store
            .assign_professor(SubjectAssignment {
                professor_id: y.id,
                subject_id: 1,
                role: AssignmentRole::Lab,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn legacy_single_subject_is_merged_into_subjects() {
        let store = MemoryStore::new();
        store.add_subject(7, 2, 3);
        let id = store.add_document(DocumentCategory::Lecture, Uuid::new_v4(), &[]);
        {
            let mut state = store.state.write().unwrap();
            state.documents.get_mut(&id).unwrap().subject_id = Some(7);
        }
        let doc = store.find_document(id).await.unwrap().unwrap();
        assert_eq!(doc.subject_ids(), vec![7]);
    }
}
