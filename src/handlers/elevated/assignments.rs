//! Admin management of professor subject assignments.
//!
//! One professor per `(subject, role)` slot; a taken slot answers 409.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::academic::{AssignmentRole, Requester, SubjectAssignment, UserRole};
use crate::audit::{AuditEntry, AuditLogger};
use crate::database::users;
use crate::database::{ArchiveStore, DatabaseError, DatabaseManager, PgStore};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub professor_id: Uuid,
    pub subject_id: i32,
    pub role: AssignmentRole,
}

/// POST /api/admin/assignments
pub async fn create_assignment(
    Extension(requester): Extension<Requester>,
    Extension(audit): Extension<Arc<AuditLogger>>,
    Json(body): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let store = PgStore::new(pool.clone());

    let professor = users::find_by_id(&pool, body.professor_id)
        .await
        .map_err(|err| ApiError::from(DatabaseError::Sqlx(err)))?
        .ok_or_else(|| ApiError::not_found("professor not found"))?;
    if professor.role != UserRole::Professor {
        return Err(ApiError::bad_request(
            "assignments can only be granted to professors",
        ));
    }

    let refs = store.find_subject_refs(&[body.subject_id]).await?;
    if refs.is_empty() {
        return Err(ApiError::not_found("subject not found"));
    }

    let assignment = SubjectAssignment {
        professor_id: body.professor_id,
        subject_id: body.subject_id,
        role: body.role,
    };
    store.assign_professor(assignment).await?;

    audit
        .record(AuditEntry::new(
            requester.id,
            "assignment.create",
            "POST",
            format!("/api/admin/assignments/{}/{}", body.subject_id, body.role),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": assignment
    })))
}

/// DELETE /api/admin/assignments/:subject_id/:role
pub async fn delete_assignment(
    Extension(requester): Extension<Requester>,
    Extension(audit): Extension<Arc<AuditLogger>>,
    Path((subject_id, role)): Path<(i32, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let role = parse_role(&role)?;
    let pool = DatabaseManager::pool().await?;
    let store = PgStore::new(pool);

    if !store.unassign_professor(subject_id, role).await? {
        return Err(ApiError::not_found("no assignment for this subject and role"));
    }

    audit
        .record(AuditEntry::new(
            requester.id,
            "assignment.delete",
            "DELETE",
            format!("/api/admin/assignments/{subject_id}/{role}"),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "subject_id": subject_id,
            "role": role,
            "removed": true
        }
    })))
}

fn parse_role(raw: &str) -> Result<AssignmentRole, ApiError> {
    match raw {
        "lecture" => Ok(AssignmentRole::Lecture),
        "tutorial" => Ok(AssignmentRole::Tutorial),
        "lab" => Ok(AssignmentRole::Lab),
        other => Err(ApiError::bad_request(format!(
            "unknown assignment role: {other}"
        ))),
    }
}
