//! Tag models and DTOs.

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
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TagWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub tag: Tag,
    pub blog_count: i64,
}

/// Tag reference embedded in blog responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTagDto {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Name must be between 1 and 30 characters"
    ))]
    #[schema(example = "rust")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTagDto {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Name must be between 1 and 30 characters"
    ))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagFilterParams {
    /// Case-insensitive match on name
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl TagFilterParams {
    pub fn predicate(&self) -> Predicate {
        Predicate::new().search(&["t.name"], self.search.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateTagDto {
        CreateTagDto {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_create_tag_dto_validation() {
        assert!(create("rust").validate().is_ok());
        assert!(create("").validate().is_err());
        assert!(create(&"t".repeat(31)).validate().is_err());
    }

    #[test]
    fn test_update_tag_dto_validation() {
        assert!(UpdateTagDto::default().validate().is_ok());
        assert!(
            UpdateTagDto {
                name: Some("t".repeat(31))
            }
            .validate()
            .is_err()
        );
    }
}
