//! crates/bookstore_core/src/error.rs
//!
//! The error taxonomy shared by the record services and the adapter ports.
//! Every failure a service can report is one of these variants, so callers
//! can render a user-facing message without parsing free text.

/// Authentication failures, split so callers can message users differently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password - deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Access token required")]
    MissingToken,
    /// The token failed signature or structural checks.
    #[error("The provided token is invalid")]
    InvalidToken,
    /// The token was well-formed and correctly signed, but past its expiry.
    #[error("Your authentication token has expired. Please login again.")]
    TokenExpired,
}

/// The primary error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Field-level validation failures, reported all together rather than
    /// short-circuiting on the first violation.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    /// A uniqueness rule was violated (duplicate email, duplicate
    /// title/author pair).
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// The requester is not the owner of the record being mutated.
    #[error("{0}")]
    Ownership(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// An I/O or encoding failure in the backing store. The message carries
    /// filesystem detail for the server log; it is never shown to clients.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True for failures the caller can correct and resubmit.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, CoreError::Storage(_))
    }
}
