//! services/api/src/adapters/password.rs
//!
//! The argon2 implementation of the `PasswordHasher` port. Every digest
//! carries its own salt; verification is delegated to the argon2 primitive,
//! which compares in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, SaltString},
    Argon2, PasswordVerifier,
};
use tracing::error;

use bookstore_core::error::{CoreError, CoreResult};
use bookstore_core::ports::PasswordHasher;

/// Slow, salted one-way hashing via argon2id with the library defaults
/// (the reference system's bcrypt cost 12 fills the same role).
#[derive(Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| {
                // The error never contains the plaintext.
                error!("password hashing failed: {e}");
                CoreError::Storage("Failed to hash password".to_string())
            })
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            error!("stored password digest is malformed");
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
