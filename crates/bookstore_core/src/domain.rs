//! crates/bookstore_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs serialize with camelCase keys so the backing JSON files
//! stay interchangeable with the reference data format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as stored in the users collection.
///
/// The `password` field holds the argon2 digest, never plaintext. It is kept
/// out of every API response via [`User::profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// The user view returned by the API - everything except the password digest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

/// A book record owned by the user who created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    /// Owning user. Not referentially enforced at the storage level.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An incoming book candidate, before validation and id/timestamp assignment.
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: Option<i32>,
}

/// Conjunctive search filters over the books collection.
///
/// Text fields match as case-insensitive substrings; `year` matches exactly.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.genre.is_none() && self.year.is_none()
    }
}

/// One page of a filtered, insertion-ordered result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// The identity facts carried inside a signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id (standard `sub` claim).
    pub sub: Uuid,
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
