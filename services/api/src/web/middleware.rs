//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, plus request logging
//! with password redaction.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use bookstore_core::error::AuthError;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Matches the request body cap set on the router.
const MAX_LOGGED_BODY: usize = 10 * 1024 * 1024;

/// Middleware that validates the bearer token and extracts the claims.
///
/// The token is verified against the signing secret and its expiry, then the
/// subject is checked against the users collection - a valid token whose
/// user has since disappeared is rejected. On success the claims are
/// inserted into request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the bearer token from the Authorization header.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    // 2. Check signature and expiry.
    let claims = state.tokens.verify(token)?;

    // 3. Tokens are stateless, so a deleted subject can only be caught here.
    if !state.users.exists(claims.sub).await? {
        debug!(user_id = %claims.sub, "token subject no longer exists");
        return Err(AuthError::InvalidToken.into());
    }

    // 4. Hand the verified identity to the handler.
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that logs every request, including the JSON payload of
/// mutating requests with any field literally named `password` redacted.
pub async fn log_requests(req: Request, next: Next) -> Result<Response, ApiError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let req = if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to buffer request body: {e}")))?;

        if let Ok(payload) = serde_json::from_slice::<Value>(&bytes) {
            debug!(%method, %path, body = %redact_password(payload), "request payload");
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        req
    };

    info!(%method, %path, "request");
    Ok(next.run(req).await)
}

/// Replaces any top-level `password` field before the value reaches a log.
fn redact_password(mut payload: Value) -> Value {
    if let Some(obj) = payload.as_object_mut() {
        if let Some(password) = obj.get_mut("password") {
            *password = Value::String("[REDACTED]".to_string());
        }
    }
    payload
}
