use std::env;

use crate::env_or;

/// Seven days.
pub const DEFAULT_TOKEN_EXPIRY: i64 = 604_800;

const DEV_SECRET: &str = "quillpress-dev-secret-change-in-production";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_SECRET.to_string()
            }
        };

        Self {
            secret,
            token_expiry: env_or("JWT_EXPIRY", DEFAULT_TOKEN_EXPIRY),
        }
    }

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        }
    }
}
