//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: user registration, login, and profile fetch.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use utoipa::ToSchema;
use uuid::Uuid;

use bookstore_core::domain::{Claims, UserProfile};
use bookstore_core::error::CoreError;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Human-readable form of the token validity window, echoed in responses.
const TOKEN_LIFETIME: &str = "24h";
const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user view sent over the wire - never includes the password digest.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<UserProfile> for UserDto {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            created_at: profile.created_at,
            last_login: profile.last_login,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: UserDto,
    pub token: String,
    pub expires_in: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Rejects requests whose email or password shape is wrong before any core
/// operation runs.
fn check_credentials_shape(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation(vec![
            "Email and password are required".to_string(),
        ])
        .into());
    }
    if !email_regex().is_match(email.trim()) {
        return Err(CoreError::Validation(vec![
            "Please provide a valid email address".to_string(),
        ])
        .into());
    }
    Ok(())
}

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid email or password shape"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_credentials_shape(&req.email, &req.password)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(vec![format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )])
        .into());
    }

    let user = state
        .users
        .register(&req.email, req.name.as_deref(), &req.password)
        .await?;
    let token = state.tokens.issue(user.id, &user.email)?;

    let response = AuthResponse {
        message: "User registered successfully".to_string(),
        user: user.profile().into(),
        token,
        expires_in: TOKEN_LIFETIME.to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Authenticate and mint a fresh token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(CoreError::Validation(vec![
            "Email and password are required".to_string(),
        ])
        .into());
    }

    let user = state.users.login(&req.email, &req.password).await?;
    let token = state.tokens.issue(user.id, &user.email)?;

    let response = AuthResponse {
        message: "Login successful".to_string(),
        user: user.profile().into(),
        token,
        expires_in: TOKEN_LIFETIME.to_string(),
    };
    Ok(Json(response))
}

/// GET /api/auth/profile - The authenticated user's own record
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.profile(claims.sub).await?;
    Ok(Json(ProfileResponse {
        user: user.profile().into(),
    }))
}
