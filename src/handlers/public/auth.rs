//! Registration and login.
//!
//! Self-service registration only creates student accounts; professor
//! and admin accounts are provisioned out of band. Login issues a JWT
//! carrying the requester's role and affiliation so the engines never
//! need a user lookup per request.

use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::academic::UserRole;
use crate::auth::{generate_jwt, password_digest, Claims};
use crate::config;
use crate::database::users::{self, NewUser};
use crate::database::{DatabaseError, DatabaseManager};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub track_id: Option<i32>,
    pub level_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
pub async fn register(
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("registration is disabled"));
    }

    let email = body.email.trim().to_lowercase();
    let username = body.username.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if body.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let pool = DatabaseManager::pool().await?;
    let new_user = NewUser {
        password_digest: password_digest(&email, &body.password),
        email,
        username,
        role: UserRole::Student,
        track_id: body.track_id,
        level_id: body.level_id,
    };

    let user = users::insert(&pool, &new_user).await.map_err(|err| {
        if users::is_unique_violation(&err) {
            ApiError::conflict("an account with this email already exists")
        } else {
            ApiError::from(DatabaseError::Sqlx(err))
        }
    })?;

    info!("registered user {} ({})", user.username, user.id);

    let token = generate_jwt(Claims::new(user.id, user.role, user.track_id, user.level_id))
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": user
        }
    })))
}

/// POST /auth/login
pub async fn login(Json(body): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.trim().to_lowercase();
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_email(&pool, &email)
        .await
        .map_err(|err| ApiError::from(DatabaseError::Sqlx(err)))?
        .ok_or_else(|| ApiError::unauthorized("invalid email or password"))?;

    if user.password_digest != password_digest(&email, &body.password) {
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let token = generate_jwt(Claims::new(user.id, user.role, user.track_id, user.level_id))
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": user
        }
    })))
}
