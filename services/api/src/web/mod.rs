//! services/api/src/web/mod.rs
//!
//! The HTTP surface: router assembly, handlers, middleware, and the master
//! definition for the OpenAPI specification.

pub mod auth;
pub mod books;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::web::auth::{login_handler, profile_handler, register_handler};
use crate::web::books::{
    create_book_handler, delete_book_handler, get_book_handler, list_books_handler,
    my_books_handler, search_books_handler, update_book_handler,
};
use crate::web::middleware::{log_requests, require_auth};
use crate::web::state::AppState;

/// Request bodies are capped at 10 MiB, matching the reference system.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::register_handler,
        auth::login_handler,
        auth::profile_handler,
        books::list_books_handler,
        books::search_books_handler,
        books::my_books_handler,
        books::get_book_handler,
        books::create_book_handler,
        books::update_book_handler,
        books::delete_book_handler,
    ),
    components(schemas(
        HealthResponse,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        auth::ProfileResponse,
        auth::UserDto,
        books::BookPayload,
        books::BookDto,
        books::PaginationDto,
        books::ListResponse,
        books::BooksResponse,
        books::BookResponse,
        books::MutationResponse,
        crate::error::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "User registration, login and profile."),
        (name = "books", description = "CRUD over the books collection, scoped by owner.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// Health Check
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Bookstore API is running".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the complete application router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [AUTHORIZATION, CONTENT_TYPE, ACCEPT];
    let cors = match &state.config.allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_credentials(true)
                .allow_methods(methods)
                .allow_headers(headers)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers),
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/auth/profile", get(profile_handler))
        .route(
            "/api/books",
            get(list_books_handler).post(create_book_handler),
        )
        .route("/api/books/search", get(search_books_handler))
        .route("/api/books/user/my-books", get(my_books_handler))
        .route(
            "/api/books/{id}",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(log_requests))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
