//! Database connection settings.
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)

use std::env;

use crate::env_or;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Returns `None` when `DATABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())?;
        Some(Self {
            url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).max(1),
        })
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}
