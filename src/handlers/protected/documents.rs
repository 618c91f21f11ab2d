//! Document endpoints: listing, retrieval, upload metadata, lifecycle.

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
use crate::database::models::DocumentCategory;
use crate::documents::{DeletedFilter, DocumentFilter, DocumentUpdate, NewDocument};
use crate::error::ApiError;
use crate::handlers::Pagination;

use super::document_service;

#[derive(Debug, Default, Deserialize)]
pub struct DocumentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub subject_id: Option<i32>,
    pub category: Option<DocumentCategory>,
    pub search: Option<String>,
    #[serde(default)]
    pub deleted: DeletedFilter,
}

impl DocumentListQuery {
    fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            subject_id: self.subject_id,
            category: self.category,
            search: self.search.clone(),
            deleted: self.deleted,
        }
    }
}

/// GET /api/documents
pub async fn list_documents(
    Extension(requester): Extension<Requester>,
    Query(query): Query<DocumentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = Pagination { page: query.page, limit: query.limit };
    let (page, limit) = pagination.resolve();

    let service = document_service().await?;
    let result = service.list(&requester, &query.filter(), page, limit).await?;

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

/// GET /api/documents/:id
pub async fn get_document(
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    let document = service.get(id, &requester).await?;

    Ok(Json(json!({
        "success": true,
        "data": document
    })))
}

/// GET /api/documents/:id/download
pub async fn download_document(
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    let file_path = service.download_path(id, &requester).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "file_path": file_path }
    })))
}

/// POST /api/documents
pub async fn create_document(
    Extension(requester): Extension<Requester>,
    Json(body): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    let document = service.create(&requester, &body).await?;

    Ok(Json(json!({
        "success": true,
        "data": document
    })))
}

/// PUT /api/documents/:id
pub async fn update_document(
    Extension(requester): Extension<Requester>,
    Path(id): Path<Uuid>,
    Json(body): Json<DocumentUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    let document = service.update(id, &requester, &body).await?;

    Ok(Json(json!({
        "success": true,
        "data": document
    })))
}

/// DELETE /api/documents/:id
pub async fn delete_document(
    Extension(requester): Extension<Requester>,
    Extension(audit): Extension<Arc<AuditLogger>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = document_service().await?;
    service.delete(id, &requester).await?;

    audit
        .record(AuditEntry::new(
            requester.id,
            "document.delete",
            "DELETE",
            format!("/api/documents/{id}"),
        ))
        .await;

    Ok(Json(json!({
        "success": true,
        "data": { "id": id, "deleted": true }
    })))
}
