use sqlx::PgPool;

use quillpress_config::{CorsConfig, JwtConfig, PaginationConfig, ServerConfig};

/// Shared by every handler: the connection pool plus immutable configuration.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub pagination_config: PaginationConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    /// Builds the state around an existing pool, reading the rest from the
    /// environment.
    pub fn from_env(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            pagination_config: PaginationConfig::from_env(),
            server_config: ServerConfig::from_env(),
        }
    }
}
