//! Admin document lifecycle: recycle bin listing and restore.

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::academic::Requester;
use crate::audit::{AuditEntry, AuditLogger};
use crate::documents::{DeletedFilter, DocumentFilter};
use crate::error::ApiError;
use crate::handlers::protected::document_service;
use crate::handlers::Pagination;

/// GET /api/admin/documents/deleted
pub async fn list_deleted_documents(
    Extension(requester): Extension<Requester>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = pagination.resolve();
    let filter = DocumentFilter { deleted: DeletedFilter::Only, ..Default::default() };

    let service = document_service().await?;
    let result = service.list(&requester, &filter, page, limit).await?;

    Ok(Json(json!({
        "success": true,
        "data": result.documents,
        "pagination": {
            "page": result.page,
            "limit": result.limit,
            "total": result.total
        }
    })))
}

/// POST /api/admin/documents/:id/restore
pub async fn restore_document(
    Extension(requester): Extension<Requester>,
    Extension(audit): Extension<Arc<AuditLogger>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    service.restore(id, &requester).await?;

    audit
        .record(AuditEntry::new(
            requester.id,
            "document.restore",
            "POST",
            format!("/api/admin/documents/{id}/restore"),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": { "id": id, "restored": true }
    })))
}
