//! Comment models, DTOs and filters.
//!
//! Comments are threaded through `parent_id`: a root comment has none, and a
//! reply may point at any comment on the same blog, including another reply.
//! New comments start `PENDING` and only `APPROVED` ones are shown on the
//! public per-blog listing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quillpress_core::PaginationParams;
use quillpress_core::serde::{deserialize_optional_parsed, deserialize_optional_uuid};
use quillpress_db::Predicate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::users::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "PENDING",
            CommentStatus::Approved => "APPROVED",
            CommentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(CommentStatus::Pending),
            "APPROVED" => Ok(CommentStatus::Approved),
            "REJECTED" => Ok(CommentStatus::Rejected),
            other => Err(format!("invalid comment status `{}`", other)),
        }
    }
}

impl TryFrom<String> for CommentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `parent_id` query filter: `null` selects root comments, a UUID selects
/// the replies to that comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    Root,
    Id(Uuid),
}

impl FromStr for ParentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("null") {
            return Ok(ParentFilter::Root);
        }
        Uuid::parse_str(s)
            .map(ParentFilter::Id)
            .map_err(|_| format!("invalid parent_id `{}`", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: CommentStatus,
    pub author_id: Uuid,
    pub blog_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its author and reply count.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub author_username: String,
    pub reply_count: i64,
}

/// A direct reply to a comment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentReply {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

impl From<CommentRow> for CommentReply {
    fn from(row: CommentRow) -> Self {
        Self {
            author: UserSummary {
                id: row.comment.author_id,
                username: row.author_username,
            },
            comment: row.comment,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
    pub reply_count: i64,
    /// Loaded on single-comment and per-blog thread lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<CommentReply>>,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        Self {
            author: UserSummary {
                id: row.comment.author_id,
                username: row.author_username,
            },
            reply_count: row.reply_count,
            replies: None,
            comment: row.comment,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
    pub blog_id: Uuid,
    /// Comment being replied to
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentStatusDto {
    pub status: CommentStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub blog_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub author_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<CommentStatus>,
    /// `null` for root comments, or a comment id for its replies
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<ParentFilter>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl CommentFilterParams {
    pub fn predicate(&self) -> Predicate {
        let predicate = Predicate::new()
            .eq("c.blog_id", self.blog_id)
            .eq("c.author_id", self.author_id)
            .eq("c.status", self.status.map(CommentStatus::as_str));

        match self.parent_id {
            Some(ParentFilter::Root) => predicate.is_null("c.parent_id", true),
            Some(ParentFilter::Id(id)) => predicate.eq("c.parent_id", Some(id)),
            None => predicate,
        }
    }
}
