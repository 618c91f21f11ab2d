//! Fixture builders shared across unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::academic::{Requester, SubjectRef, UserRole};
use crate::database::models::{Comment, Document, DocumentCategory, DocumentWithSubjects};

/// Deterministic base instant for fixture timestamps.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
}

pub fn student(track_id: i32, level_id: i32) -> Requester {
    Requester {
        id: Uuid::new_v4(),
        role: UserRole::Student,
        track_id: Some(track_id),
        level_id: Some(level_id),
    }
}

pub fn professor() -> Requester {
    Requester { id: Uuid::new_v4(), role: UserRole::Professor, track_id: None, level_id: None }
}

pub fn admin() -> Requester {
    Requester { id: Uuid::new_v4(), role: UserRole::Admin, track_id: None, level_id: None }
}

pub fn document(
    category: DocumentCategory,
    owner_id: Uuid,
    subjects: Vec<SubjectRef>,
) -> DocumentWithSubjects {
    let now = base_time();
    DocumentWithSubjects {
        document: Document {
            id: Uuid::new_v4(),
            title: "fixture document".into(),
            category,
            owner_id,
            subject_id: None,
            file_path: None,
            view_count: 0,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        },
        subjects,
    }
}

/// A comment created `minutes` after the fixture base time.
pub fn comment_by(
    document_id: Uuid,
    author_id: Uuid,
    author_role: UserRole,
    parent_id: Option<Uuid>,
    minutes: i64,
) -> Comment {
    let at = base_time() + Duration::minutes(minutes);
    Comment {
        id: Uuid::new_v4(),
        document_id,
        author_id,
        author_role,
        parent_id,
        content: format!("comment at +{minutes}m"),
        is_edited: false,
        is_deleted: false,
        deleted_at: None,
        deleted_by: None,
        created_at: at,
        updated_at: at,
    }
}
