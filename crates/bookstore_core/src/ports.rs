//! crates/bookstore_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the storage format and the crypto primitives.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Claims;
use crate::error::{AuthError, CoreResult};

/// Load/save access to one whole collection of records.
///
/// A collection is the full ordered set of records of one entity type,
/// materialized as a single backing file. Each store instance exclusively
/// owns its file; the services layered on top serialize their
/// load-mutate-save cycles, so implementations only need to make each
/// individual call safe.
#[async_trait]
pub trait CollectionStore<T>: Send + Sync {
    /// Returns the full collection in insertion order.
    ///
    /// Implementations must materialize an empty collection on first access
    /// and degrade to an empty sequence when the stored content is absent or
    /// not a valid array, rather than failing the read.
    async fn load(&self) -> CoreResult<Vec<T>>;

    /// Replaces the entire stored collection with `records`.
    ///
    /// Encoding and I/O failures are surfaced as `CoreError::Storage`, never
    /// swallowed.
    async fn save(&self, records: &[T]) -> CoreResult<()>;
}

/// One-way password hashing with per-digest salt.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `plaintext` with a freshly generated salt.
    fn hash(&self, plaintext: &str) -> CoreResult<String>;

    /// Verifies `plaintext` against a stored digest. Comparison is delegated
    /// to the hashing primitive, which is constant-time-safe.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Issuance and verification of signed, time-limited bearer tokens.
///
/// Tokens are stateless: never persisted, never revocable server-side.
pub trait TokenService: Send + Sync {
    /// Signs a claims payload for `user_id`, valid for a fixed window from
    /// issuance.
    fn issue(&self, user_id: Uuid, email: &str) -> CoreResult<String>;

    /// Checks signature integrity and expiry, returning the embedded claims.
    ///
    /// Distinguishes [`AuthError::TokenExpired`] from
    /// [`AuthError::InvalidToken`] so callers can message users differently.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}
