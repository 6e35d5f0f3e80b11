//! # Quillpress DB
//!
//! Database pool management and query helpers for the Quillpress API.
//!
//! - [`init_db_pool`] / [`close_db_pool`]: pool lifecycle, owned by the binary
//! - [`filter`]: conjunctive listing predicates rendered into parameterized SQL
//!
//! # Example
//!
//! ```ignore
//! use quillpress_config::DatabaseConfig;
//! use quillpress_db::init_db_pool;
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = init_db_pool(&config).await?;
//! ```

use std::time::Duration;

use quillpress_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub mod filter;

pub use filter::{Clause, Predicate, Value};
pub use sqlx::PgPool;

/// Opens a PostgreSQL connection pool.
///
/// The pool is cheaply cloneable; create it once at startup and hand it to
/// the application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Waits for checked-out connections to be returned, then closes the pool.
pub async fn close_db_pool(pool: &PgPool) {
    pool.close().await;
    info!("Database pool closed");
}
