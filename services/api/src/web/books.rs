//! services/api/src/web/books.rs
//!
//! REST handlers for the books collection. These are thin wrappers: shape
//! the query/body, call the record service, shape the response.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use bookstore_core::domain::{Book, BookDraft, BookFilter, Claims};
use bookstore_core::services::books::DEFAULT_PER_PAGE;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

/// An incoming book candidate. Validation happens in the record service.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: Option<i32>,
}

impl From<BookPayload> for BookDraft {
    fn from(payload: BookPayload) -> Self {
        BookDraft {
            title: payload.title,
            author: payload.author,
            genre: payload.genre,
            published_year: payload.published_year,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            published_year: book.published_year,
            user_id: book.user_id,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_books: usize,
    pub books_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<BookDto>,
    pub pagination: PaginationDto,
}

#[derive(Serialize, ToSchema)]
pub struct BooksResponse {
    pub success: bool,
    pub data: Vec<BookDto>,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub success: bool,
    pub data: BookDto,
}

#[derive(Serialize, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    pub data: BookDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/books - Filtered, paginated listing
#[utoipa::path(
    get,
    path = "/api/books",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of matching books", body = ListResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = BookFilter {
        title: query.title,
        author: query.author,
        genre: query.genre,
        year: None,
    };
    let page = state
        .books
        .list(
            &filter,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PER_PAGE),
        )
        .await?;

    let pagination = PaginationDto {
        current_page: page.page,
        total_pages: page.total_pages,
        total_books: page.total,
        books_per_page: page.per_page,
        has_next_page: page.page < page.total_pages,
        has_prev_page: page.page > 1,
    };
    Ok(Json(ListResponse {
        success: true,
        data: page.items.into_iter().map(BookDto::from).collect(),
        pagination,
    }))
}

/// GET /api/books/search - Unpaginated search; needs at least one parameter
#[utoipa::path(
    get,
    path = "/api/books/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "All matching books", body = BooksResponse),
        (status = 400, description = "No search parameter given"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn search_books_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = BookFilter {
        title: query.title,
        author: query.author,
        genre: query.genre,
        year: query.year,
    };
    let found = state.books.search(&filter).await?;
    Ok(Json(BooksResponse {
        success: true,
        count: found.len(),
        data: found.into_iter().map(BookDto::from).collect(),
    }))
}

/// GET /api/books/user/my-books - Everything the requester owns
#[utoipa::path(
    get,
    path = "/api/books/user/my-books",
    responses(
        (status = 200, description = "The requester's books", body = BooksResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn my_books_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mine = state.books.owned_by(claims.sub).await?;
    Ok(Json(BooksResponse {
        success: true,
        count: mine.len(),
        data: mine.into_iter().map(BookDto::from).collect(),
    }))
}

/// GET /api/books/{id} - Fetch one book
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "No book with this id"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.books.get(id).await?;
    Ok(Json(BookResponse {
        success: true,
        data: book.into(),
    }))
}

/// POST /api/books - Create a book owned by the requester
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = MutationResponse),
        (status = 400, description = "Validation failures, all reported together"),
        (status = 409, description = "Duplicate title/author pair"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.books.create(&payload.into(), claims.sub).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            success: true,
            message: "Book created successfully".to_string(),
            data: book.into(),
        }),
    ))
}

/// PUT /api/books/{id} - Replace a book the requester owns
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MutationResponse),
        (status = 400, description = "Validation failures"),
        (status = 403, description = "Requester does not own this book"),
        (status = 404, description = "No book with this id"),
        (status = 409, description = "Duplicate title/author pair"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.books.update(id, &payload.into(), claims.sub).await?;
    Ok(Json(MutationResponse {
        success: true,
        message: "Book updated successfully".to_string(),
        data: book.into(),
    }))
}

/// DELETE /api/books/{id} - Remove a book the requester owns
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted; the removed record is returned", body = MutationResponse),
        (status = 403, description = "Requester does not own this book"),
        (status = 404, description = "No book with this id"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_token" = [])),
    tag = "books"
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.books.delete(id, claims.sub).await?;
    Ok(Json(MutationResponse {
        success: true,
        message: "Book deleted successfully".to_string(),
        data: book.into(),
    }))
}
