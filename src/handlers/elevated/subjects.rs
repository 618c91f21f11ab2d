use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::database::models::Subject;
use crate::database::{DatabaseError, DatabaseManager};
use crate::error::ApiError;

/// GET /api/admin/subjects
///
/// Flat subject listing backing the assignment management UI.
pub async fn list_subjects() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, semester_id, track_id FROM subjects ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    .map_err(|err| ApiError::from(DatabaseError::Sqlx(err)))?;

    Ok(Json(json!({
        "success": true,
        "data": subjects
    })))
}
