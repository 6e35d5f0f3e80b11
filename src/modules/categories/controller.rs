use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quillpress_core::{AppError, Paginated};
use quillpress_models::auth::MessageResponse;
use quillpress_models::categories::{
    Category, CategoryFilterParams, CategoryWithCount, CreateCategoryDto, UpdateCategoryDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::categories::service::CategoryService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

#[utoipa::path(
    post,
    path = "/api/metadata/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryService::create_category(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/metadata/categories",
    params(CategoryFilterParams),
    responses(
        (status = 200, description = "Categories ordered by name", body = Paginated<CategoryWithCount>)
    ),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    ValidatedQuery(filters): ValidatedQuery<CategoryFilterParams>,
) -> Result<Json<Paginated<CategoryWithCount>>, AppError> {
    let categories =
        CategoryService::get_categories(&state.db, &state.pagination_config, filters).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/metadata/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryWithCount),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryWithCount>, AppError> {
    let category = CategoryService::get_category_by_id(&state.db, id).await?;
    Ok(Json(category))
}

#[utoipa::path(
    get,
    path = "/api/metadata/categories/slug/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category details", body = CategoryWithCount),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryWithCount>, AppError> {
    let category = CategoryService::get_category_by_slug(&state.db, &slug).await?;
    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/api/metadata/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCategoryDto>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryService::update_category(&state.db, id, dto).await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/metadata/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    CategoryService::delete_category(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
