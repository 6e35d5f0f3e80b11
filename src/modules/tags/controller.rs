use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quillpress_core::{AppError, Paginated};
use quillpress_models::auth::MessageResponse;
use quillpress_models::tags::{CreateTagDto, Tag, TagFilterParams, TagWithCount, UpdateTagDto};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::tags::service::TagService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

#[utoipa::path(
    post,
    path = "/api/metadata/tags",
    request_body = CreateTagDto,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn create_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTagDto>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = TagService::create_tag(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

#[utoipa::path(
    get,
    path = "/api/metadata/tags",
    params(TagFilterParams),
    responses(
        (status = 200, description = "Tags ordered by name", body = Paginated<TagWithCount>)
    ),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn get_tags(
    State(state): State<AppState>,
    ValidatedQuery(filters): ValidatedQuery<TagFilterParams>,
) -> Result<Json<Paginated<TagWithCount>>, AppError> {
    let tags = TagService::get_tags(&state.db, &state.pagination_config, filters).await?;
    Ok(Json(tags))
}

#[utoipa::path(
    get,
    path = "/api/metadata/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag details", body = TagWithCount),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TagWithCount>, AppError> {
    let tag = TagService::get_tag_by_id(&state.db, id).await?;
    Ok(Json(tag))
}

#[utoipa::path(
    get,
    path = "/api/metadata/tags/slug/{slug}",
    params(("slug" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag details", body = TagWithCount),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn get_tag_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TagWithCount>, AppError> {
    let tag = TagService::get_tag_by_slug(&state.db, &slug).await?;
    Ok(Json(tag))
}

#[utoipa::path(
    put,
    path = "/api/metadata/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = UpdateTagDto,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn update_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTagDto>,
) -> Result<Json<Tag>, AppError> {
    let tag = TagService::update_tag(&state.db, id, dto).await?;
    Ok(Json(tag))
}

#[utoipa::path(
    delete,
    path = "/api/metadata/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
#[instrument(skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    TagService::delete_tag(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Tag deleted successfully")))
}
