//! Blog post models, DTOs and filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quillpress_core::PaginationParams;
use quillpress_core::serde::{
    deserialize_optional_bool, deserialize_optional_parsed, deserialize_optional_string,
    deserialize_optional_uuid, deserialize_optional_uuid_list,
};
use quillpress_db::Predicate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::categories::CategorySummary;
use crate::tags::TagSummary;
use crate::users::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlogStatus {
    Draft,
    Published,
    Archived,
}

impl BlogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BlogStatus::Draft => "DRAFT",
            BlogStatus::Published => "PUBLISHED",
            BlogStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(BlogStatus::Draft),
            "PUBLISHED" => Ok(BlogStatus::Published),
            "ARCHIVED" => Ok(BlogStatus::Archived),
            other => Err(format!("invalid blog status `{}`", other)),
        }
    }
}

impl TryFrom<String> for BlogStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: BlogStatus,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog joined with author, category and counts. Tags are loaded separately.
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    #[sqlx(flatten)]
    pub blog: Blog,
    pub author_username: String,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub comment_count: i64,
    pub like_count: i64,
}

/// Tag link row used to attach tags to a page of blogs.
#[derive(Debug, Clone, FromRow)]
pub struct BlogTagRow {
    pub blog_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogWithRelations {
    #[serde(flatten)]
    pub blog: Blog,
    pub author: UserSummary,
    pub category: Option<CategorySummary>,
    pub tags: Vec<TagSummary>,
    pub comment_count: i64,
    pub like_count: i64,
    /// Present only when the request is authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_me: Option<bool>,
}

impl BlogWithRelations {
    pub fn from_row(row: BlogRow, tags: Vec<TagSummary>) -> Self {
        let category = match (row.blog.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategorySummary { id, name, slug }),
            _ => None,
        };

        Self {
            author: UserSummary {
                id: row.blog.author_id,
                username: row.author_username,
            },
            category,
            tags,
            comment_count: row.comment_count,
            like_count: row.like_count,
            liked_by_me: None,
            blog: row.blog,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBlogDto {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[schema(example = "Getting started with Rust")]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub excerpt: Option<String>,
    #[validate(url(message = "Featured image must be a valid URL"))]
    pub featured_image: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
    /// Publish immediately instead of saving a draft
    pub published: Option<bool>,
}

/// Partial update. `tag_ids`, when present, replaces the whole tag set.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBlogDto {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[validate(url(message = "Featured image must be a valid URL"))]
    pub featured_image: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub status: Option<BlogStatus>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogFilterParams {
    /// Case-insensitive match on title, content or excerpt
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub category_id: Option<Uuid>,
    /// Comma-separated tag ids; matches blogs carrying any of them
    #[serde(default, deserialize_with = "deserialize_optional_uuid_list")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub tag_ids: Option<Vec<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub author_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<BlogStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub published: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl BlogFilterParams {
    pub fn predicate(&self) -> Predicate {
        Predicate::new()
            .search(
                &["b.title", "b.content", "b.excerpt"],
                self.search.as_deref(),
            )
            .eq("b.category_id", self.category_id)
            .in_subquery(
                "b.id",
                "SELECT blog_id FROM blog_tags WHERE tag_id",
                self.tag_ids.clone(),
            )
            .eq("b.author_id", self.author_id)
            .eq("b.status", self.status.map(BlogStatus::as_str))
            .eq("b.published", self.published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpress_db::{Clause, Value};

    fn create_dto(title: &str) -> CreateBlogDto {
        CreateBlogDto {
            title: title.to_string(),
            content: "Body".to_string(),
            excerpt: None,
            featured_image: None,
            category_id: None,
            tag_ids: None,
            published: None,
        }
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("published".parse::<BlogStatus>(), Ok(BlogStatus::Published));
        assert_eq!(BlogStatus::Archived.to_string(), "ARCHIVED");
        assert!("deleted".parse::<BlogStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&BlogStatus::Draft).unwrap(),
            r#""DRAFT""#
        );
    }

    #[test]
    fn test_create_blog_dto_validation() {
        assert!(create_dto("Hello").validate().is_ok());
        assert!(create_dto("").validate().is_err());
        assert!(create_dto(&"x".repeat(201)).validate().is_err());

        let mut bad_image = create_dto("Hello");
        bad_image.featured_image = Some("nope".to_string());
        assert!(bad_image.validate().is_err());

        let mut no_content = create_dto("Hello");
        no_content.content = String::new();
        assert!(no_content.validate().is_err());
    }

    #[test]
    fn test_update_blog_dto_validation() {
        assert!(UpdateBlogDto::default().validate().is_ok());
        let empty_title = UpdateBlogDto {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(BlogFilterParams::default().predicate().is_empty());
    }

    #[test]
    fn test_status_filter_is_one_clause() {
        let filters = BlogFilterParams {
            status: Some(BlogStatus::Published),
            ..Default::default()
        };
        let predicate = filters.predicate();
        assert_eq!(
            predicate.clauses(),
            &[Clause::Equals {
                column: "b.status",
                value: Value::Text("PUBLISHED".to_string())
            }]
        );
    }

    #[test]
    fn test_all_filters_present() {
        let filters = BlogFilterParams {
            search: Some("rust".to_string()),
            category_id: Some(Uuid::new_v4()),
            tag_ids: Some(vec![Uuid::new_v4(), Uuid::new_v4()]),
            author_id: Some(Uuid::new_v4()),
            status: Some(BlogStatus::Draft),
            published: Some(false),
            pagination: PaginationParams::default(),
        };
        assert_eq!(filters.predicate().len(), 6);
    }

    #[test]
    fn test_filter_params_from_query_values() {
        let json = r#"{"status":"PUBLISHED","published":"true","search":"","page":"2"}"#;
        let filters: BlogFilterParams = serde_json::from_str(json).unwrap();
        assert_eq!(filters.status, Some(BlogStatus::Published));
        assert_eq!(filters.published, Some(true));
        assert!(filters.search.is_none());
        assert_eq!(filters.pagination.page, Some(2));
    }

    #[test]
    fn test_with_relations_serialization() {
        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            content: "Body".to_string(),
            excerpt: None,
            featured_image: None,
            status: BlogStatus::Published,
            published: true,
            published_at: Some(now),
            author_id: Uuid::new_v4(),
            category_id: None,
            created_at: now,
            updated_at: now,
        };
        let row = BlogRow {
            blog,
            author_username: "ada".to_string(),
            category_name: None,
            category_slug: None,
            comment_count: 3,
            like_count: 7,
        };
        let json = serde_json::to_value(BlogWithRelations::from_row(row, vec![])).unwrap();
        assert_eq!(json["slug"], "hello");
        assert_eq!(json["status"], "PUBLISHED");
        assert_eq!(json["author"]["username"], "ada");
        assert!(json["category"].is_null());
        assert_eq!(json["like_count"], 7);
        assert!(json.get("liked_by_me").is_none());
    }
}
