//! Logging setup and per-request logging middleware.
//!
//! Console output is filtered by `RUST_LOG` (default `quillpress=info`). Two
//! daily-rolling files are written under `storage/logs`: plain-text errors
//! and JSON records at `info` and above.

use std::fs;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR: &str = "storage/logs";

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    response
}

/// Installs the global subscriber. Falls back to console-only logging when
/// the log directory cannot be created.
pub fn init_tracing() {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,tower_http=warn,sqlx=warn",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        tracing_subscriber::registry().with(console_layer).init();
        warn!(error = %e, dir = LOG_DIR, "Could not create log directory, logging to console only");
        return;
    }

    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            LOG_DIR,
            "quillpress.log",
        ))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            LOG_DIR,
            "quillpress.json",
        ))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();
}
