use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use quillpress::logging::init_tracing;
use quillpress::metrics::init_metrics;
use quillpress::router::init_router;
use quillpress::state::AppState;
use quillpress_config::DatabaseConfig;
use quillpress_db::{close_db_pool, init_db_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let db_config = DatabaseConfig::from_env().ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;
    let pool = init_db_pool(&db_config)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::from_env(pool.clone());
    let addr = state.server_config.bind_addr();
    let environment = state.server_config.environment;
    let app = init_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, ?environment, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_db_pool(&pool).await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
