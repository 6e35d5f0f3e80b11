//! Token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret. Verification is
//! stateless: there is no revocation, and expiry is checked without leeway.
//!
//! ```ignore
//! let token = create_token(&payload, &jwt_config)?;
//! let caller = verify_token(&token, &jwt_config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use quillpress_config::JwtConfig;
use quillpress_core::AppError;

use crate::claims::{AuthPayload, Claims};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature, malformed token or malformed payload.
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

impl TokenError {
    /// Maps into a 401 carrying this error's message.
    pub fn into_app_error(self) -> AppError {
        AppError::unauthorized(self)
    }
}

/// Issues a token for `payload` using the configured lifetime.
pub fn create_token(payload: &AuthPayload, jwt_config: &JwtConfig) -> Result<String, AppError> {
    create_token_with_ttl(payload, &jwt_config.secret, jwt_config.token_expiry)
}

/// Issues a token that expires `ttl_seconds` from now.
pub fn create_token_with_ttl(
    payload: &AuthPayload,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user: payload.clone(),
        exp: now.saturating_add(ttl_seconds).max(0) as usize,
        iat: now as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

/// Verifies a token's signature and expiry and returns the identity.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<AuthPayload, TokenError> {
    verify_with_secret(token, &jwt_config.secret)
}

pub fn verify_with_secret(token: &str, secret: &str) -> Result<AuthPayload, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.user)
    .map_err(|e| match e.kind() {
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpress_core::ErrorKind;
    use uuid::Uuid;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-at-least-32-characters-long")
    }

    fn payload() -> AuthPayload {
        AuthPayload {
            id: Uuid::new_v4(),
            email: "writer@example.com".to_string(),
            username: "writer".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let config = test_config();
        let payload = payload();

        let token = create_token(&payload, &config).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = verify_token(&token, &config).unwrap();
        assert_eq!(verified, payload);
    }

    #[test]
    fn test_expired_token() {
        let config = test_config();
        let token = create_token_with_ttl(&payload(), &config.secret, -60).unwrap();
        assert_eq!(verify_token(&token, &config), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_token(&payload(), &test_config()).unwrap();
        let other = JwtConfig::new("different-secret-key-at-least-32-characters");
        assert_eq!(verify_token(&token, &other), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_token() {
        assert_eq!(
            verify_token("not-a-token", &test_config()),
            Err(TokenError::Invalid)
        );
        assert_eq!(verify_token("", &test_config()), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload() {
        let config = test_config();
        let token = create_token(&payload(), &config).unwrap();
        let forged = create_token(&payload(), &config).unwrap();
        let forged_body = forged.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_body;
        let tampered = parts.join(".");
        assert_eq!(verify_token(&tampered, &config), Err(TokenError::Invalid));
    }

    #[test]
    fn test_default_lifetime_is_seven_days() {
        let config = test_config();
        let token = create_token(&payload(), &config).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 604_800);
    }

    #[test]
    fn test_token_error_maps_to_unauthenticated() {
        let err = TokenError::Expired.into_app_error();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.public_message(), "Token expired");
    }
}
