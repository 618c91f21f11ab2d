//! Comment endpoints: threaded listing, reply gate probe, CRUD.

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::academic::Requester;
use crate::audit::{AuditEntry, AuditLogger};
use crate::error::ApiError;
use crate::handlers::Pagination;

use super::comment_service;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// GET /api/documents/:id/comments
pub async fn list_document_comments(
    Extension(requester): Extension<Requester>,
    Path(document_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = pagination.resolve();
    let service = comment_service().await?;
    let thread = service
        .get_document_comments(document_id, &requester, page, limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": thread.comments,
        "can_moderate": thread.can_moderate,
        "pagination": {
            "page": thread.page,
            "limit": thread.limit,
            "total": thread.total
        }
    })))
}

/// POST /api/documents/:id/comments
pub async fn create_comment(
    Extension(requester): Extension<Requester>,
    Path(document_id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = comment_service().await?;
    let comment = service
        .create_comment(document_id, &requester, &body.content, body.parent_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comment
    })))
}

/// GET /api/comments/:id/reply-gate
///
/// Lets clients disable the reply box without a failed POST.
pub async fn reply_gate(
    Extension(requester): Extension<Requester>,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = comment_service().await?;
    let gate = service.reply_gate(comment_id, &requester).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "can_reply": gate.can_reply,
            "reason": gate.reason
        }
    })))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    Extension(requester): Extension<Requester>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = comment_service().await?;
    let comment = service
        .update_comment(comment_id, &requester, &body.content)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comment
    })))
}

/// DELETE /api/comments/:id
///
/// Soft-deletes the comment and its direct replies.
pub async fn delete_comment(
    Extension(requester): Extension<Requester>,
    Extension(audit): Extension<Arc<AuditLogger>>,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = comment_service().await?;
    let deleted_count = service.delete_comment(comment_id, &requester).await?;

    audit
        .record(AuditEntry::new(
            requester.id,
            "comment.delete",
            "DELETE",
            format!("/api/comments/{comment_id}"),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": comment_id,
            "deleted_count": deleted_count
        }
    })))
}
