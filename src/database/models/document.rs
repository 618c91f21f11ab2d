use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::academic::SubjectRef;

/// Category a document is filed under.
///
/// Capstone documents are not tied to subjects; access is gated by the
/// requester's terminal-level status instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "document_category", rename_all = "snake_case")]
pub enum DocumentCategory {
    Lecture,
    Tutorial,
    Lab,
    Exam,
    Capstone,
}

impl DocumentCategory {
    pub fn is_capstone(self) -> bool {
        matches!(self, DocumentCategory::Capstone)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub category: DocumentCategory,
    pub owner_id: Uuid,
    /// Legacy single-subject column, still honored by the access rules.
    /// Newer uploads attach subjects through the join table instead.
    pub subject_id: Option<i32>,
    pub file_path: Option<String>,
    pub view_count: i64,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document hydrated with its resolved subjects (legacy single-subject
/// and join-table subjects merged, each carrying track and level).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentWithSubjects {
    #[serde(flatten)]
    pub document: Document,
    pub subjects: Vec<SubjectRef>,
}

impl DocumentWithSubjects {
    pub fn id(&self) -> Uuid {
        self.document.id
    }

    pub fn subject_ids(&self) -> Vec<i32> {
        self.subjects.iter().map(|s| s.id).collect()
    }
}
