//! Category models and DTOs.

use chrono::{DateTime, Utc};
use quillpress_core::PaginationParams;
use quillpress_core::serde::deserialize_optional_string;
use quillpress_db::Predicate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub blog_count: i64,
}

/// Category reference embedded in blog responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    #[schema(example = "Engineering")]
    pub name: String,
    pub description: Option<String>,
}

/// Supplying `name` always regenerates the slug.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryFilterParams {
    /// Case-insensitive match on name or description
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl CategoryFilterParams {
    pub fn predicate(&self) -> Predicate {
        Predicate::new().search(&["c.name", "c.description"], self.search.as_deref())
    }
}
