//! crates/bookstore_core/src/services/users.rs
//!
//! The record service for the users collection. Enforces case-insensitive
//! email uniqueness and owns the credential checks for login.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::User;
use crate::error::{AuthError, CoreError, CoreResult};
use crate::ports::{CollectionStore, PasswordHasher};

/// CRUD policy over the users collection.
///
/// Every operation runs a full load-check-mutate-save cycle under the
/// collection lock, so two concurrent registrations cannot both pass the
/// uniqueness check against the same stale snapshot.
pub struct UserService {
    store: Arc<dyn CollectionStore<User>>,
    hasher: Arc<dyn PasswordHasher>,
    lock: Mutex<()>,
}

impl UserService {
    pub fn new(store: Arc<dyn CollectionStore<User>>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            lock: Mutex::new(()),
        }
    }

    /// Registers a new user.
    ///
    /// The email is stored lowercased; a missing display name defaults to
    /// the email's local part. Fails with `Conflict` when the email is
    /// already taken, compared case-insensitively.
    pub async fn register(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
    ) -> CoreResult<User> {
        let _guard = self.lock.lock().await;

        let email = email.trim().to_lowercase();
        let mut users = self.store.load().await?;

        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(CoreError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        let digest = self.hasher.hash(password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            password: digest,
            created_at: now,
            updated_at: now,
            last_login: None,
        };

        users.push(user.clone());
        self.store.save(&users).await?;
        Ok(user)
    }

    /// Verifies credentials and stamps the last-login timestamp.
    ///
    /// Unknown email and wrong password both come back as
    /// `AuthError::InvalidCredentials` - callers cannot tell which.
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<User> {
        let _guard = self.lock.lock().await;

        let email = email.trim().to_lowercase();
        let mut users = self.store.load().await?;

        let idx = users
            .iter()
            .position(|u| u.email.eq_ignore_ascii_case(&email))
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &users[idx].password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        users[idx].last_login = Some(Utc::now());
        self.store.save(&users).await?;
        Ok(users[idx].clone())
    }

    pub async fn profile(&self, id: Uuid) -> CoreResult<User> {
        let _guard = self.lock.lock().await;
        let users = self.store.load().await?;
        users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    /// Whether the user behind a verified token still exists. Tokens are
    /// stateless, so deleted subjects can only be caught here.
    pub async fn exists(&self, id: Uuid) -> CoreResult<bool> {
        let _guard = self.lock.lock().await;
        let users = self.store.load().await?;
        Ok(users.iter().any(|u| u.id == id))
    }
}
