//! Authentication middleware resolving the acting principal
//!
//! If bearer tokens are configured, validates the Authorization header and
//! maps the token to its owning user. With no tokens configured, every
//! request acts as the configured local user (local mode).

use super::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

/// The authenticated caller, available to handlers via request extensions
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Authentication middleware
///
/// Expected header format: `Authorization: Bearer <token>`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // No tokens configured: local single-user mode
    if state.auth.tokens.is_empty() {
        request.extensions_mut().insert(Principal {
            user_id: state.auth.local_user,
        });
        return next.run(request).await;
    }

    // Check Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let provided_token = &header[7..]; // Skip "Bearer "

            match state.auth.tokens.get(provided_token) {
                Some(user_id) => {
                    request
                        .extensions_mut()
                        .insert(Principal { user_id: *user_id });
                    next.run(request).await
                }
                None => (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": "Invalid token"
                    })),
                )
                    .into_response(),
            }
        }
        Some(_) => {
            // Authorization header exists but wrong format
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Invalid Authorization header format. Expected: Bearer <token>"
                })),
            )
                .into_response()
        }
        None => {
            // No Authorization header
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Token required. Set Authorization: Bearer <token>"
                })),
            )
                .into_response()
        }
    }
}
