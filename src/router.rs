use anyhow::anyhow;
use axum::extract::OriginalUri;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use quillpress_config::CorsConfig;
use quillpress_core::AppError;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::init_auth_router;
use crate::modules::blogs::init_blogs_router;
use crate::modules::categories::init_categories_router;
use crate::modules::comments::init_comments_router;
use crate::modules::health::init_health_router;
use crate::modules::tags::init_tags_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    // Credentials cannot be combined with a wildcard origin.
    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    layer.allow_origin(allowed_origins).allow_credentials(true)
}

async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::not_found(anyhow!("Route {} {} not found", method, uri.path()))
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/health", init_health_router())
        .nest("/auth", init_auth_router())
        .nest("/users", init_users_router())
        .nest("/blogs", init_blogs_router())
        .nest("/comments", init_comments_router())
        .nest(
            "/metadata",
            Router::new()
                .nest("/categories", init_categories_router())
                .nest("/tags", init_tags_router()),
        )
        .route_layer(middleware::from_fn(metrics_middleware))
}

/// Builds the application. `/metrics` is only served when a Prometheus
/// recorder was installed.
pub fn init_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router())
        .fallback(route_not_found);

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    router
        .with_state(state.clone())
        .layer(cors_layer(&state.cors_config))
        .layer(middleware::from_fn(logging_middleware))
}
