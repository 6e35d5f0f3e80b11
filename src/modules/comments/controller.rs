use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quillpress_core::{AppError, Paginated, PaginationParams};
use quillpress_models::auth::MessageResponse;
use quillpress_models::comments::{
    CommentFilterParams, CommentWithAuthor, CreateCommentDto, UpdateCommentDto,
    UpdateCommentStatusDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::comments::service::CommentService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

/// Comment on a blog, or reply to another comment on it
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created, pending moderation", body = CommentWithAuthor),
        (status = 400, description = "Validation error or invalid parent", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Blog or parent comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<CommentWithAuthor>), AppError> {
    let comment = CommentService::create_comment(&state.db, auth_user.payload(), dto).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentFilterParams),
    responses(
        (status = 200, description = "Paginated list of comments", body = Paginated<CommentWithAuthor>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn get_comments(
    State(state): State<AppState>,
    ValidatedQuery(filters): ValidatedQuery<CommentFilterParams>,
) -> Result<Json<Paginated<CommentWithAuthor>>, AppError> {
    let comments =
        CommentService::get_comments(&state.db, &state.pagination_config, filters).await?;
    Ok(Json(comments))
}

/// Approved top-level comments on a blog with their approved replies
#[utoipa::path(
    get,
    path = "/api/comments/blog/{blog_id}",
    params(
        ("blog_id" = Uuid, Path, description = "Blog ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Comment threads", body = Paginated<CommentWithAuthor>)
    ),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn get_comments_by_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> Result<Json<Paginated<CommentWithAuthor>>, AppError> {
    let comments = CommentService::get_comments_by_blog(
        &state.db,
        &state.pagination_config,
        blog_id,
        params,
    )
    .await?;
    Ok(Json(comments))
}

#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment with replies", body = CommentWithAuthor),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommentWithAuthor>, AppError> {
    let comment = CommentService::get_comment_by_id(&state.db, id).await?;
    Ok(Json(comment))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentWithAuthor),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn update_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCommentDto>,
) -> Result<Json<CommentWithAuthor>, AppError> {
    let comment = CommentService::update_comment(&state.db, auth_user.payload(), id, dto).await?;
    Ok(Json(comment))
}

/// Moderate a comment
#[utoipa::path(
    patch,
    path = "/api/comments/{id}/status",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = UpdateCommentStatusDto,
    responses(
        (status = 200, description = "Status updated", body = CommentWithAuthor),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn update_comment_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCommentStatusDto>,
) -> Result<Json<CommentWithAuthor>, AppError> {
    let comment = CommentService::update_comment_status(&state.db, id, dto.status).await?;
    Ok(Json(comment))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    CommentService::delete_comment(&state.db, auth_user.payload(), id).await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
