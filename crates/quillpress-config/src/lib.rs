//! # Quillpress Config
//!
//! Configuration types for the Quillpress API, loaded from environment
//! variables (a `.env` file is read by the binary before any of these run).
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: connection string and pool size
//! - [`jwt`]: token signing secret and lifetime
//! - [`pagination`]: default and maximum page sizes
//! - [`server`]: bind address and deployment environment
//!
//! # Example
//!
//! ```ignore
//! use quillpress_config::{DatabaseConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let database_config = DatabaseConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

use std::env;
use std::str::FromStr;

pub mod cors;
pub mod database;
pub mod jwt;
pub mod pagination;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use pagination::PaginationConfig;
pub use server::{Environment, ServerConfig};

/// Reads and parses `key`, falling back to `default` when it is unset or
/// does not parse.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
