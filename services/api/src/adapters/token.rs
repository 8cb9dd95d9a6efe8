//! services/api/src/adapters/token.rs
//!
//! The jsonwebtoken implementation of the `TokenService` port: HS256-signed
//! bearer tokens carrying {sub, email, iat, exp}, valid for a fixed 24 hour
//! window from issuance. Tokens are stateless - nothing is stored and
//! nothing can be revoked.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use bookstore_core::domain::Claims;
use bookstore_core::error::{AuthError, CoreError, CoreResult};
use bookstore_core::ports::TokenService;

/// Fixed validity window for every issued token.
const TOKEN_TTL_HOURS: i64 = 24;

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    /// The secret comes from startup configuration; there is no fallback.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The expiry boundary is exact: a token is rejected at T+24h, not
        // T+24h plus the default leeway.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: Uuid, email: &str) -> CoreResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CoreError::Storage(format!("failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        // The library's own check is strict (`exp < now`), which would still
        // accept a token during the very second it expires. The validity
        // window is [iat, exp): the expiry instant itself is rejected.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_claims() {
        let svc = JwtTokenService::new("test-secret");
        let user_id = Uuid::new_v4();

        let token = svc.issue(user_id, "a@x.com").unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_invalid_not_expired() {
        let svc = JwtTokenService::new("test-secret");
        let other = JwtTokenService::new("different-secret");

        let token = other.issue(Uuid::new_v4(), "a@x.com").unwrap();
        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::InvalidToken);
        assert_eq!(svc.verify("garbage").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn expiry_is_a_distinct_error_kind() {
        let svc = JwtTokenService::new("test-secret");
        let now = Utc::now();

        // A hand-signed token already past its window.
        let stale = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: (now - Duration::hours(25)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn the_expiry_instant_itself_is_rejected() {
        let svc = JwtTokenService::new("test-secret");
        let now = Utc::now();

        // exp == now: inside the expiry second, no longer inside the window.
        let boundary = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: (now - Duration::hours(24)).timestamp(),
            exp: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &boundary,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::TokenExpired);

        // Comfortably inside the window: still accepted.
        let live = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &live,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(svc.verify(&token).is_ok());
    }
}
