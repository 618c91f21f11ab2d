use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;

use crate::academic::Requester;
use crate::database::users;
use crate::database::{DatabaseError, DatabaseManager};
use crate::error::ApiError;

/// GET /api/me
pub async fn me(Extension(requester): Extension<Requester>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_id(&pool, requester.id)
        .await
        .map_err(|err| ApiError::from(DatabaseError::Sqlx(err)))?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(json!({
        "success": true,
        "data": user
    })))
}
