//! # rf-auth-jwt
//!
//! Argon2 + HS256 implementation of `AuthProvider`.
//! Handles password hashing and stateless signed session tokens.

use async_trait::async_trait;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rf_core::error::{AppError, Result};
use rf_core::models::Actor;
use rf_core::traits::AuthProvider;

/// Session lifetime: two hours, the admin-aware variant.
const SESSION_TTL_SECS: i64 = 2 * 60 * 60;

/// Claim set carried by every session token. Stateless by design: there is
/// no server-side revocation list, expiry is the only kill switch.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id, stringified UUID.
    sub: String,
    /// Admin flag embedded so authorization needs no extra store read.
    /// A promoted/demoted user must log in again for it to update.
    admin: bool,
    /// Issued-at (Unix seconds).
    iat: i64,
    /// Expiry (Unix seconds).
    exp: i64,
}

pub struct JwtAuthProvider {
    /// HMAC secret for signing tokens (e.g., from an environment variable).
    secret: String,
}

impl JwtAuthProvider {
    pub fn new(secret: &str) -> Self {
        Self { secret: secret.to_string() }
    }

    fn issue_with_ttl(&self, actor_id: Uuid, is_admin: bool, ttl_secs: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: actor_id.to_string(),
            admin: is_admin,
            iat: now,
            exp: now + ttl_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| AppError::Internal(format!("token signing failed: {err}")))
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    /// Argon2 with a fresh random salt. The hash runs on a blocking thread
    /// so a burst of signups cannot stall the reactor.
    async fn hash_password(&self, plain: &str) -> Result<String> {
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(plain.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))
        })
        .await
        .map_err(|err| AppError::Internal(format!("hashing task failed: {err}")))?
    }

    /// Returns false for a mismatch or an unparseable stored hash; neither
    /// is an error from the caller's point of view.
    async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&hash) {
                Ok(p) => p,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|err| AppError::Internal(format!("verification task failed: {err}")))
    }

    fn issue_token(&self, actor_id: Uuid, is_admin: bool) -> Result<String> {
        self.issue_with_ttl(actor_id, is_admin, SESSION_TTL_SECS)
    }

    /// Any defect — bad signature, garbage input, expired claims, a subject
    /// that is not a UUID — collapses to `Unauthorized`. Never fails open.
    fn verify_token(&self, token: &str) -> Result<Actor> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry must be exact, not "close enough".
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| AppError::Unauthorized(format!("invalid session token: {err}")))?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid session subject".to_string()))?;

        Ok(Actor { id, is_admin: data.claims.admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_round_trip() {
        let auth = JwtAuthProvider::new("test-secret");
        let hash = auth.hash_password("Secret#1").await.unwrap();
        assert_ne!(hash, "Secret#1");
        assert!(auth.verify_password("Secret#1", &hash).await.unwrap());
        assert!(!auth.verify_password("Secret#2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_verifies_false_not_err() {
        let auth = JwtAuthProvider::new("test-secret");
        assert!(!auth.verify_password("whatever", "not-a-phc-string").await.unwrap());
    }

    #[test]
    fn token_round_trip_carries_identity_and_admin_claim() {
        let auth = JwtAuthProvider::new("test-secret");
        let id = Uuid::now_v7();

        let token = auth.issue_token(id, true).unwrap();
        let actor = auth.verify_token(&token).unwrap();
        assert_eq!(actor.id, id);
        assert!(actor.is_admin);
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let auth = JwtAuthProvider::new("test-secret");
        let token = auth.issue_with_ttl(Uuid::now_v7(), false, -60).unwrap();
        let err = auth.verify_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn foreign_signature_is_unauthorized() {
        let auth = JwtAuthProvider::new("test-secret");
        let other = JwtAuthProvider::new("different-secret");
        let token = other.issue_token(Uuid::now_v7(), false).unwrap();
        assert!(matches!(
            auth.verify_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let auth = JwtAuthProvider::new("test-secret");
        assert!(matches!(
            auth.verify_token("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
