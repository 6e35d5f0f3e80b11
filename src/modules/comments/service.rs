use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use quillpress_auth::AuthPayload;
use quillpress_config::PaginationConfig;
use quillpress_core::{AppError, Paginated, PaginationParams};
use quillpress_models::comments::{
    Comment, CommentFilterParams, CommentReply, CommentRow, CommentStatus, CommentWithAuthor,
    CreateCommentDto, UpdateCommentDto,
};

use crate::metrics::track_comment_created;

const COMMENT_COLUMNS: &str =
    "id, content, status, author_id, blog_id, parent_id, created_at, updated_at";

const COMMENT_SELECT: &str = r#"SELECT
        c.id,
        c.content,
        c.status,
        c.author_id,
        c.blog_id,
        c.parent_id,
        c.created_at,
        c.updated_at,
        u.username AS author_username,
        (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
    FROM comments c
    JOIN users u ON u.id = c.author_id"#;

pub struct CommentService;

impl CommentService {
    /// Creates a comment, or a reply when `parent_id` is set. A reply must
    /// target a root comment on the same blog.
    #[instrument(skip(db, caller, dto), fields(author_id = %caller.id, blog_id = %dto.blog_id))]
    pub async fn create_comment(
        db: &PgPool,
        caller: &AuthPayload,
        dto: CreateCommentDto,
    ) -> Result<CommentWithAuthor, AppError> {
        let blog_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blogs WHERE id = $1)")
                .bind(dto.blog_id)
                .fetch_one(db)
                .await?;

        if !blog_exists {
            return Err(AppError::not_found(anyhow!("Blog not found")));
        }

        if let Some(parent_id) = dto.parent_id {
            let parent = sqlx::query_as::<_, Comment>(&format!(
                "SELECT {} FROM comments WHERE id = $1",
                COMMENT_COLUMNS
            ))
            .bind(parent_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Parent comment not found")))?;

            if parent.blog_id != dto.blog_id {
                return Err(AppError::bad_request(anyhow!(
                    "Parent comment belongs to a different blog"
                )));
            }
        }

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"INSERT INTO comments (content, status, author_id, blog_id, parent_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            COMMENT_COLUMNS
        ))
        .bind(&dto.content)
        .bind(CommentStatus::Pending.as_str())
        .bind(caller.id)
        .bind(dto.blog_id)
        .bind(dto.parent_id)
        .fetch_one(db)
        .await?;

        track_comment_created(comment.parent_id.is_some());
        info!(comment_id = %comment.id, "Comment created");

        Self::get_comment_by_id(db, comment.id).await
    }

    #[instrument(skip(db))]
    pub async fn get_comments(
        db: &PgPool,
        pagination: &PaginationConfig,
        filters: CommentFilterParams,
    ) -> Result<Paginated<CommentWithAuthor>, AppError> {
        let window = filters
            .pagination
            .window(pagination.default_limit, pagination.max_limit);
        let predicate = filters.predicate();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments c");
        predicate.push_where(&mut count_query);

        let mut data_query = QueryBuilder::<Postgres>::new(COMMENT_SELECT);
        predicate.push_where(&mut data_query);
        data_query
            .push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(window.take)
            .push(" OFFSET ")
            .push_bind(window.skip);

        let (total, rows) = tokio::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(db),
            data_query.build_query_as::<CommentRow>().fetch_all(db),
        )?;

        Ok(window.into_page(
            rows.into_iter().map(CommentWithAuthor::from).collect(),
            total,
        ))
    }

    /// Public thread view: approved root comments, newest first, each with
    /// its approved replies in posting order.
    #[instrument(skip(db))]
    pub async fn get_comments_by_blog(
        db: &PgPool,
        pagination: &PaginationConfig,
        blog_id: Uuid,
        params: PaginationParams,
    ) -> Result<Paginated<CommentWithAuthor>, AppError> {
        let window = params.window(pagination.default_limit, pagination.max_limit);

        let data_sql = format!(
            r#"{}
               WHERE c.blog_id = $1 AND c.status = $2 AND c.parent_id IS NULL
               ORDER BY c.created_at DESC
               LIMIT $3 OFFSET $4"#,
            COMMENT_SELECT
        );

        let (total, rows) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM comments c WHERE c.blog_id = $1 AND c.status = $2 AND c.parent_id IS NULL",
            )
            .bind(blog_id)
            .bind(CommentStatus::Approved.as_str())
            .fetch_one(db),
            sqlx::query_as::<_, CommentRow>(&data_sql)
            .bind(blog_id)
            .bind(CommentStatus::Approved.as_str())
            .bind(window.take)
            .bind(window.skip)
            .fetch_all(db),
        )?;

        let root_ids: Vec<Uuid> = rows.iter().map(|row| row.comment.id).collect();
        let mut replies = Self::replies_for(db, &root_ids, Some(CommentStatus::Approved)).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let mut comment = CommentWithAuthor::from(row);
                comment.replies = Some(replies.remove(&comment.comment.id).unwrap_or_default());
                comment
            })
            .collect();

        Ok(window.into_page(data, total))
    }

    /// A single comment with all of its replies, whatever their status.
    #[instrument(skip(db))]
    pub async fn get_comment_by_id(db: &PgPool, id: Uuid) -> Result<CommentWithAuthor, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!("{} WHERE c.id = $1", COMMENT_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Comment not found")))?;

        let mut replies = Self::replies_for(db, &[id], None).await?;
        let mut comment = CommentWithAuthor::from(row);
        comment.replies = Some(replies.remove(&id).unwrap_or_default());

        Ok(comment)
    }

    #[instrument(skip(db, caller, dto), fields(caller_id = %caller.id))]
    pub async fn update_comment(
        db: &PgPool,
        caller: &AuthPayload,
        id: Uuid,
        dto: UpdateCommentDto,
    ) -> Result<CommentWithAuthor, AppError> {
        let existing = Self::find_comment(db, id).await?;

        if existing.author_id != caller.id {
            return Err(AppError::forbidden(anyhow!(
                "Not authorized to update this comment"
            )));
        }

        sqlx::query("UPDATE comments SET content = $1, updated_at = NOW() WHERE id = $2")
            .bind(&dto.content)
            .bind(id)
            .execute(db)
            .await?;

        Self::get_comment_by_id(db, id).await
    }

    /// Moderation. Open to any authenticated caller.
    #[instrument(skip(db))]
    pub async fn update_comment_status(
        db: &PgPool,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<CommentWithAuthor, AppError> {
        let result =
            sqlx::query("UPDATE comments SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Comment not found")));
        }

        info!(comment_id = %id, status = %status, "Comment status updated");
        Self::get_comment_by_id(db, id).await
    }

    /// Deleting a root comment removes its replies too.
    #[instrument(skip(db, caller), fields(caller_id = %caller.id))]
    pub async fn delete_comment(
        db: &PgPool,
        caller: &AuthPayload,
        id: Uuid,
    ) -> Result<(), AppError> {
        let existing = Self::find_comment(db, id).await?;

        if existing.author_id != caller.id {
            return Err(AppError::forbidden(anyhow!(
                "Not authorized to delete this comment"
            )));
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn find_comment(db: &PgPool, id: Uuid) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Comment not found")))
    }

    async fn replies_for(
        db: &PgPool,
        parent_ids: &[Uuid],
        status: Option<CommentStatus>,
    ) -> Result<HashMap<Uuid, Vec<CommentReply>>, AppError> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Postgres>::new(COMMENT_SELECT);
        query
            .push(" WHERE c.parent_id = ANY(")
            .push_bind(parent_ids.to_vec())
            .push(")");
        if let Some(status) = status {
            query.push(" AND c.status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY c.created_at ASC");

        let rows = query.build_query_as::<CommentRow>().fetch_all(db).await?;

        let mut replies: HashMap<Uuid, Vec<CommentReply>> = HashMap::new();
        for row in rows {
            if let Some(parent_id) = row.comment.parent_id {
                replies.entry(parent_id).or_default().push(row.into());
            }
        }

        Ok(replies)
    }
}
