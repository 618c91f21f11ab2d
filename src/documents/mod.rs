//! Document operations: filtered listing, lifecycle (soft delete /
//! restore), view counting, and download gating.
//!
//! Every entry point runs the access engine before touching anything
//! else; ownership rules gate mutation on top of that.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::academic::{Requester, SubjectAssignment, TerminalLevels, UserRole};
use crate::access::can_access_document;
use crate::database::models::{DocumentCategory, DocumentWithSubjects};
use crate::database::store::ArchiveStore;
use crate::error::CoreError;

/// Soft-delete visibility for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletedFilter {
    /// Live documents only.
    #[default]
    Exclude,
    /// Live and deleted together (admin).
    Include,
    /// Deleted documents only (admin recycle bin).
    Only,
}

/// Explicit listing filter; one field per supported dimension instead of
/// an ad hoc optional-field bag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    pub subject_id: Option<i32>,
    pub category: Option<DocumentCategory>,
    pub search: Option<String>,
    #[serde(default)]
    pub deleted: DeletedFilter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub category: DocumentCategory,
    #[serde(default)]
    pub subject_ids: Vec<i32>,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub subject_ids: Option<Vec<i32>>,
    pub file_path: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subject_ids.is_none() && self.file_path.is_none()
    }
}

/// One page of documents visible to the requester.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPage {
    pub documents: Vec<DocumentWithSubjects>,
    pub page: i64,
    pub limit: i64,
    /// Total matching the filter before per-document access checks.
    pub total: i64,
}

pub struct DocumentService<S> {
    store: S,
    terminal_levels: TerminalLevels,
}

impl<S: ArchiveStore> DocumentService<S> {
    pub fn new(store: S, terminal_levels: TerminalLevels) -> Self {
        Self { store, terminal_levels }
    }

    async fn assignments_for(
        &self,
        requester: &Requester,
        subject_ids: &[i32],
    ) -> Result<Vec<SubjectAssignment>, CoreError> {
        if requester.role != UserRole::Professor || subject_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .find_subject_assignments(requester.id, subject_ids)
            .await?)
    }

    async fn require_access(
        &self,
        doc: &DocumentWithSubjects,
        requester: &Requester,
    ) -> Result<(), CoreError> {
        let assignments = self.assignments_for(requester, &doc.subject_ids()).await?;
        if !can_access_document(doc, requester, &assignments, &self.terminal_levels) {
            return Err(CoreError::Forbidden(
                "you do not have access to this document".into(),
            ));
        }
        Ok(())
    }

    fn require_owner_or_admin(
        doc: &DocumentWithSubjects,
        requester: &Requester,
        action: &str,
    ) -> Result<(), CoreError> {
        if requester.is_admin() || doc.document.owner_id == requester.id {
            return Ok(());
        }
        Err(CoreError::Forbidden(format!(
            "only the owner or an admin may {action} a document"
        )))
    }

    async fn load(&self, id: Uuid) -> Result<DocumentWithSubjects, CoreError> {
        self.store
            .find_document(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("document not found".into()))
    }

    async fn load_live(
        &self,
        id: Uuid,
        requester: &Requester,
    ) -> Result<DocumentWithSubjects, CoreError> {
        let doc = self.load(id).await?;
        // Deleted documents stay visible to admins only.
        if doc.document.is_deleted && !requester.is_admin() {
            return Err(CoreError::NotFound("document not found".into()));
        }
        Ok(doc)
    }

    fn validate_subjects(category: DocumentCategory, subject_ids: &[i32]) -> Result<(), CoreError> {
        if category.is_capstone() {
            if !subject_ids.is_empty() {
                return Err(CoreError::BadRequest(
                    "capstone documents are not tied to subjects".into(),
                ));
            }
        } else if subject_ids.is_empty() {
            return Err(CoreError::BadRequest(
                "document requires at least one subject".into(),
            ));
        }
        Ok(())
    }

    async fn resolve_subjects(&self, subject_ids: &[i32]) -> Result<(), CoreError> {
        let refs = self.store.find_subject_refs(subject_ids).await?;
        if refs.len() != subject_ids.len() {
            return Err(CoreError::BadRequest("unknown subject reference".into()));
        }
        Ok(())
    }

    /// List documents matching `filter`, retaining only those the
    /// requester may access. Deleted visibility is admin-only.
    pub async fn list(
        &self,
        requester: &Requester,
        filter: &DocumentFilter,
        page: i64,
        limit: i64,
    ) -> Result<DocumentPage, CoreError> {
        if filter.deleted != DeletedFilter::Exclude && !requester.is_admin() {
            return Err(CoreError::Forbidden(
                "only admins may list deleted documents".into(),
            ));
        }

        let page = page.max(1);
        let limit = limit.max(1);
        // Saturating: an absurd page number yields an empty page, not
        // an overflow or a negative offset.
        let offset = page.saturating_sub(1).saturating_mul(limit);

        let (candidates, total) = self.store.list_documents(filter, offset, limit).await?;

        // One assignment lookup across the page for professors.
        let mut all_subject_ids: Vec<i32> = candidates
            .iter()
            .flat_map(|d| d.subject_ids())
            .collect();
        all_subject_ids.sort_unstable();
        all_subject_ids.dedup();
        let assignments = self.assignments_for(requester, &all_subject_ids).await?;

        let documents = candidates
            .into_iter()
            .filter(|doc| {
                can_access_document(doc, requester, &assignments, &self.terminal_levels)
            })
            .collect();

        Ok(DocumentPage { documents, page, limit, total })
    }

    /// Fetch a document and count the view.
    pub async fn get(
        &self,
        id: Uuid,
        requester: &Requester,
    ) -> Result<DocumentWithSubjects, CoreError> {
        let mut doc = self.load_live(id, requester).await?;
        self.require_access(&doc, requester).await?;
        doc.document.view_count = self.store.increment_view_count(id).await?;
        Ok(doc)
    }

    /// Resolve the stored file path for download. Streaming itself is
    /// the file layer's concern; only the gate lives here.
    pub async fn download_path(&self, id: Uuid, requester: &Requester) -> Result<String, CoreError> {
        let doc = self.load_live(id, requester).await?;
        self.require_access(&doc, requester).await?;
        doc.document
            .file_path
            .clone()
            .ok_or_else(|| CoreError::NotFound("document has no stored file".into()))
    }

    pub async fn create(
        &self,
        requester: &Requester,
        new: &NewDocument,
    ) -> Result<DocumentWithSubjects, CoreError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(CoreError::BadRequest("document title cannot be empty".into()));
        }
        Self::validate_subjects(new.category, &new.subject_ids)?;
        if !new.subject_ids.is_empty() {
            self.resolve_subjects(&new.subject_ids).await?;
        }
        Ok(self.store.insert_document(requester.id, new).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        requester: &Requester,
        patch: &DocumentUpdate,
    ) -> Result<DocumentWithSubjects, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::BadRequest("nothing to update".into()));
        }
        let doc = self.load_live(id, requester).await?;
        self.require_access(&doc, requester).await?;
        Self::require_owner_or_admin(&doc, requester, "update")?;

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(CoreError::BadRequest("document title cannot be empty".into()));
            }
        }
        if let Some(subject_ids) = &patch.subject_ids {
            Self::validate_subjects(doc.document.category, subject_ids)?;
            if !subject_ids.is_empty() {
                self.resolve_subjects(subject_ids).await?;
            }
        }

        self.store.update_document(id, patch).await?;
        self.load(id).await
    }

    pub async fn delete(&self, id: Uuid, requester: &Requester) -> Result<(), CoreError> {
        let doc = self.load_live(id, requester).await?;
        if doc.document.is_deleted {
            return Err(CoreError::NotFound("document not found".into()));
        }
        self.require_access(&doc, requester).await?;
        Self::require_owner_or_admin(&doc, requester, "delete")?;
        self.store
            .soft_delete_document(id, requester.id, Utc::now())
            .await?;
        Ok(())
    }

    /// Admin-only: clear the soft-delete stamp.
    pub async fn restore(&self, id: Uuid, requester: &Requester) -> Result<(), CoreError> {
        if !requester.is_admin() {
            return Err(CoreError::Forbidden("only admins may restore documents".into()));
        }
        if self.store.restore_document(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound("document not found or not deleted".into()))
        }
    }
}
