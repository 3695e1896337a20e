//! Session token issuance and validation
//!
//! Tokens are HS256 JWTs carrying the user's id, email and role. Keys are
//! derived once from the configured secret and shared behind `Arc`.

use acquisitions_shared::{Role, UserResponse};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed JWT keys
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Signs and verifies session tokens.
///
/// Create once at startup and store in `AppState`; cloning is cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiry_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            expiry_secs,
        }
    }

    /// Sign a token for the given user
    pub fn issue(&self, user: &UserResponse) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiry_secs);

        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Validate a token and return its claims.
    ///
    /// Fails on a bad signature, a malformed token or an expired `exp`.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        Ok(token_data.claims)
    }

    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEVEN_DAYS: i64 = 7 * 24 * 60 * 60;

    fn user() -> UserResponse {
        UserResponse {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new("test-secret", SEVEN_DAYS);
        let user = user();

        let token = service.issue(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, SEVEN_DAYS);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret-one", SEVEN_DAYS);
        let verifier = JwtService::new("secret-two", SEVEN_DAYS);

        let token = issuer.issue(&user()).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default validation leeway
        let service = JwtService::new("test-secret", -3600);
        let token = service.issue(&user()).unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = JwtService::new("test-secret", SEVEN_DAYS);
        assert!(service.validate_token("invalid.token.here").is_err());
        assert!(service.validate_token("").is_err());
    }

    #[test]
    fn test_clone_shares_keys() {
        let service = JwtService::new("test-secret", SEVEN_DAYS);
        let cloned = service.clone();

        let token = service.issue(&user()).unwrap();
        assert!(cloned.validate_token(&token).is_ok());
    }
}
