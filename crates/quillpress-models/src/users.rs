//! User and profile models.

use chrono::{DateTime, Utc};
use quillpress_core::PaginationParams;
use quillpress_core::serde::deserialize_optional_string;
use quillpress_db::Predicate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A registered user. The password hash is never loaded into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login lookup row, including the bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserCredentials {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author shown on blogs and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

/// User row with activity counts.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithCounts {
    #[sqlx(flatten)]
    pub user: User,
    pub blog_count: i64,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserCounts {
    pub blogs: i64,
    pub comments: i64,
    pub likes: i64,
}

/// A user with profile and counts, as returned by user lookups.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<Profile>,
    pub counts: UserCounts,
}

impl UserDetail {
    pub fn new(row: UserWithCounts, profile: Option<Profile>) -> Self {
        Self {
            counts: UserCounts {
                blogs: row.blog_count,
                comments: row.comment_count,
                likes: row.like_count,
            },
            user: row.user,
            profile,
        }
    }
}

/// Creates or replaces the caller's profile. Absent fields are stored empty.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpsertProfileDto {
    #[validate(length(max = 100, message = "First name must be less than 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be less than 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 2000, message = "Bio must be less than 2000 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    /// Case-insensitive match on username or email
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl UserFilterParams {
    pub fn predicate(&self) -> Predicate {
        Predicate::new().search(&["u.username", "u.email"], self.search.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dto_validation() {
        let valid = UpsertProfileDto {
            first_name: Some("Ada".to_string()),
            website: Some("https://ada.dev".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let empty = UpsertProfileDto::default();
        assert!(empty.validate().is_ok());

        let bad_url = UpsertProfileDto {
            avatar: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_user_filter_predicate() {
        assert!(UserFilterParams::default().predicate().is_empty());

        let filters = UserFilterParams {
            search: Some("ada".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.predicate().len(), 1);
    }

    #[test]
    fn test_user_detail_serializes_flat() {
        let now = Utc::now();
        let row = UserWithCounts {
            user: User {
                id: Uuid::new_v4(),
                email: "ada@example.com".to_string(),
                username: "ada".to_string(),
                created_at: now,
                updated_at: now,
            },
            blog_count: 2,
            comment_count: 5,
            like_count: 1,
        };
        let json = serde_json::to_value(UserDetail::new(row, None)).unwrap();
        assert_eq!(json["username"], "ada");
        assert_eq!(json["counts"]["comments"], 5);
        assert!(json["profile"].is_null());
        assert!(json.get("password").is_none());
    }
}
