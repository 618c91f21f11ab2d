use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::academic::Requester;
use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// JWT authentication middleware that validates tokens and injects the
/// requesting identity into the request extensions.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let token = extract_jwt_from_headers(&headers).map_err(unauthorized)?;
    let claims = validate_jwt(&token).map_err(unauthorized)?;

    request.extensions_mut().insert(claims.requester());

    Ok(next.run(request).await)
}

/// Restricts a route group to admins. Layered after `jwt_auth_middleware`.
pub async fn admin_only_middleware(
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let requester = request.extensions().get::<Requester>();
    match requester {
        Some(requester) if requester.is_admin() => Ok(next.run(request).await),
        Some(_) => {
            let api_error = ApiError::forbidden("admin access required");
            Err((
                StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::FORBIDDEN),
                Json(api_error.to_json()),
            ))
        }
        None => {
            let api_error = ApiError::unauthorized("authentication required");
            Err((
                StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
                Json(api_error.to_json()),
            ))
        }
    }
}

fn unauthorized(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthorized(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
