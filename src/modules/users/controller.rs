use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use quillpress_core::{AppError, Paginated};
use quillpress_models::auth::MessageResponse;
use quillpress_models::users::{UserDetail, UserFilterParams};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedQuery;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated list of users", body = Paginated<UserDetail>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    ValidatedQuery(filters): ValidatedQuery<UserFilterParams>,
) -> Result<Json<Paginated<UserDetail>>, AppError> {
    let users = UserService::get_users(&state.db, &state.pagination_config, filters).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDetail),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, AppError> {
    let user = UserService::get_user_by_id(&state.db, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/users/username/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User details", body = UserDetail),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserDetail>, AppError> {
    let user = UserService::get_user_by_username(&state.db, &username).await?;
    Ok(Json(user))
}

/// Delete your own account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::delete_user(&state.db, auth_user.payload(), id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
