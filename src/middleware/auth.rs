//! Bearer-token extractors.
//!
//! [`AuthUser`] rejects the request with 401 when the `Authorization` header
//! is missing, malformed, or carries an invalid or expired token.
//! [`MaybeAuthUser`] never rejects: anything short of a valid token yields an
//! anonymous caller.

use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use quillpress_auth::{AuthPayload, TokenError, verify_token};
use quillpress_core::AppError;

use crate::state::AppState;

/// Returns the token from `Authorization: Bearer <token>`, if present.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized(anyhow!("Invalid authorization header format")))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthPayload);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.id
    }

    pub fn payload(&self) -> &AuthPayload {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized(anyhow!("Access denied. No token provided")))?;

        let payload = verify_token(token, &state.jwt_config).map_err(TokenError::into_app_error)?;

        Ok(AuthUser(payload))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthPayload>);

impl MaybeAuthUser {
    pub fn payload(&self) -> Option<&AuthPayload> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let payload = match bearer_token(parts) {
            Ok(Some(token)) => verify_token(token, &state.jwt_config).ok(),
            _ => None,
        };

        Ok(MaybeAuthUser(payload))
    }
}
