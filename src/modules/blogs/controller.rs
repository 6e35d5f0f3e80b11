use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quillpress_core::{AppError, Paginated};
use quillpress_models::auth::MessageResponse;
use quillpress_models::blogs::{
    BlogFilterParams, BlogWithRelations, CreateBlogDto, LikeResponse, UpdateBlogDto,
};

use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::blogs::service::BlogService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogDto,
    responses(
        (status = 201, description = "Blog created", body = BlogWithRelations),
        (status = 400, description = "Validation error or unknown category/tag", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn create_blog(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateBlogDto>,
) -> Result<(StatusCode, Json<BlogWithRelations>), AppError> {
    let blog = BlogService::create_blog(&state.db, auth_user.payload(), dto).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// List blogs. Authenticated callers also get `liked_by_me`.
#[utoipa::path(
    get,
    path = "/api/blogs",
    params(BlogFilterParams),
    responses(
        (status = 200, description = "Paginated list of blogs", body = Paginated<BlogWithRelations>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn get_blogs(
    State(state): State<AppState>,
    maybe_user: MaybeAuthUser,
    ValidatedQuery(filters): ValidatedQuery<BlogFilterParams>,
) -> Result<Json<Paginated<BlogWithRelations>>, AppError> {
    let blogs = BlogService::get_blogs(
        &state.db,
        &state.pagination_config,
        filters,
        maybe_user.payload(),
    )
    .await?;
    Ok(Json(blogs))
}

#[utoipa::path(
    get,
    path = "/api/blogs/my",
    params(BlogFilterParams),
    responses(
        (status = 200, description = "The caller's blogs", body = Paginated<BlogWithRelations>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn get_my_blogs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedQuery(filters): ValidatedQuery<BlogFilterParams>,
) -> Result<Json<Paginated<BlogWithRelations>>, AppError> {
    let blogs = BlogService::get_my_blogs(
        &state.db,
        &state.pagination_config,
        filters,
        auth_user.payload(),
    )
    .await?;
    Ok(Json(blogs))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog details", body = BlogWithRelations),
        (status = 404, description = "Blog not found", body = ErrorResponse)
    ),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    maybe_user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogWithRelations>, AppError> {
    let blog = BlogService::get_blog_by_id(&state.db, id, maybe_user.payload()).await?;
    Ok(Json(blog))
}

#[utoipa::path(
    get,
    path = "/api/blogs/slug/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Blog details", body = BlogWithRelations),
        (status = 404, description = "Blog not found", body = ErrorResponse)
    ),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn get_blog_by_slug(
    State(state): State<AppState>,
    maybe_user: MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<BlogWithRelations>, AppError> {
    let blog = BlogService::get_blog_by_slug(&state.db, &slug, maybe_user.payload()).await?;
    Ok(Json(blog))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = UpdateBlogDto,
    responses(
        (status = 200, description = "Blog updated", body = BlogWithRelations),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn update_blog(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateBlogDto>,
) -> Result<Json<BlogWithRelations>, AppError> {
    let blog = BlogService::update_blog(&state.db, auth_user.payload(), id, dto).await?;
    Ok(Json(blog))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    BlogService::delete_blog(&state.db, auth_user.payload(), id).await?;
    Ok(Json(MessageResponse::new("Blog deleted successfully")))
}

/// Like the blog, or remove an existing like
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/like",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "New like state", body = LikeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Blog not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    let response = BlogService::toggle_like(&state.db, auth_user.payload(), id).await?;
    Ok(Json(response))
}
