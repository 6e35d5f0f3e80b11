use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use quillpress_core::AppError;
use quillpress_models::auth::{AuthResponse, LoginRequest, RegisterRequest};
use quillpress_models::users::{Profile, UpsertProfileDto, UserDetail};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::service::AuthService;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Validation failed")]
    pub error: String,
    pub message: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error or email/username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = AuthService::register(&state.db, &state.jwt_config, dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = AuthService::login(&state.db, &state.jwt_config, dto).await?;
    Ok(Json(response))
}

/// Current user with profile and counts
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = UserDetail),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserDetail>, AppError> {
    let user = UserService::get_user_by_id(&state.db, auth_user.user_id()).await?;
    Ok(Json(user))
}

/// Create or replace the current user's profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpsertProfileDto,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpsertProfileDto>,
) -> Result<Json<Profile>, AppError> {
    let profile = UserService::upsert_profile(&state.db, auth_user.user_id(), dto).await?;
    Ok(Json(profile))
}
