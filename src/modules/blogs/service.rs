use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use quillpress_auth::AuthPayload;
use quillpress_config::PaginationConfig;
use quillpress_core::{AppError, Paginated, ensure_unique, slugify};
use quillpress_models::blogs::{
    Blog, BlogFilterParams, BlogRow, BlogStatus, BlogTagRow, BlogWithRelations, CreateBlogDto,
    LikeResponse, UpdateBlogDto,
};
use quillpress_models::tags::TagSummary;

use crate::metrics::track_blog_created;

const BLOG_COLUMNS: &str = "id, title, slug, content, excerpt, featured_image, status, published, published_at, author_id, category_id, created_at, updated_at";

const BLOG_SELECT: &str = r#"SELECT
        b.id,
        b.title,
        b.slug,
        b.content,
        b.excerpt,
        b.featured_image,
        b.status,
        b.published,
        b.published_at,
        b.author_id,
        b.category_id,
        b.created_at,
        b.updated_at,
        u.username AS author_username,
        c.name AS category_name,
        c.slug AS category_slug,
        (SELECT COUNT(*) FROM comments cm WHERE cm.blog_id = b.id) AS comment_count,
        (SELECT COUNT(*) FROM likes l WHERE l.blog_id = b.id) AS like_count
    FROM blogs b
    JOIN users u ON u.id = b.author_id
    LEFT JOIN categories c ON c.id = b.category_id"#;

async fn slug_taken(db: &PgPool, slug: String) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blogs WHERE slug = $1)")
        .bind(slug)
        .fetch_one(db)
        .await
}

/// New `published_at` for an update: set on first publish, cleared on
/// unpublish, otherwise unchanged.
fn next_published_state(existing: &Blog, requested: Option<bool>) -> (bool, Option<DateTime<Utc>>) {
    match requested {
        Some(true) if !existing.published => (true, Some(Utc::now())),
        Some(true) => (true, existing.published_at),
        Some(false) => (false, None),
        None => (existing.published, existing.published_at),
    }
}

pub struct BlogService;

impl BlogService {
    #[instrument(skip(db, caller, dto), fields(author_id = %caller.id, title = %dto.title))]
    pub async fn create_blog(
        db: &PgPool,
        caller: &AuthPayload,
        dto: CreateBlogDto,
    ) -> Result<BlogWithRelations, AppError> {
        let slug = ensure_unique(&slugify(&dto.title), None, |candidate| {
            slug_taken(db, candidate)
        })
        .await?;

        let published = dto.published.unwrap_or(false);
        let status = if published {
            BlogStatus::Published
        } else {
            BlogStatus::Draft
        };
        let published_at = published.then(Utc::now);

        let mut tx = db.begin().await?;

        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"INSERT INTO blogs
                   (title, slug, content, excerpt, featured_image, status, published, published_at, author_id, category_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {}"#,
            BLOG_COLUMNS
        ))
        .bind(&dto.title)
        .bind(&slug)
        .bind(&dto.content)
        .bind(&dto.excerpt)
        .bind(&dto.featured_image)
        .bind(status.as_str())
        .bind(published)
        .bind(published_at)
        .bind(caller.id)
        .bind(dto.category_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tag_ids) = &dto.tag_ids {
            Self::link_tags(&mut tx, blog.id, tag_ids).await?;
        }

        tx.commit().await?;

        track_blog_created(published);
        info!(blog_id = %blog.id, slug = %blog.slug, "Blog created");

        Self::get_blog_by_id(db, blog.id, Some(caller)).await
    }

    #[instrument(skip(db, caller))]
    pub async fn get_blogs(
        db: &PgPool,
        pagination: &PaginationConfig,
        filters: BlogFilterParams,
        caller: Option<&AuthPayload>,
    ) -> Result<Paginated<BlogWithRelations>, AppError> {
        let window = filters
            .pagination
            .window(pagination.default_limit, pagination.max_limit);
        let predicate = filters.predicate();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blogs b");
        predicate.push_where(&mut count_query);

        let mut data_query = QueryBuilder::<Postgres>::new(BLOG_SELECT);
        predicate.push_where(&mut data_query);
        data_query
            .push(" ORDER BY b.created_at DESC LIMIT ")
            .push_bind(window.take)
            .push(" OFFSET ")
            .push_bind(window.skip);

        let (total, rows) = tokio::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(db),
            data_query.build_query_as::<BlogRow>().fetch_all(db),
        )?;

        let blogs = Self::with_relations(db, rows, caller).await?;
        Ok(window.into_page(blogs, total))
    }

    /// The caller's own blogs; any `author_id` filter is overridden.
    #[instrument(skip(db, caller), fields(author_id = %caller.id))]
    pub async fn get_my_blogs(
        db: &PgPool,
        pagination: &PaginationConfig,
        mut filters: BlogFilterParams,
        caller: &AuthPayload,
    ) -> Result<Paginated<BlogWithRelations>, AppError> {
        filters.author_id = Some(caller.id);
        Self::get_blogs(db, pagination, filters, Some(caller)).await
    }

    #[instrument(skip(db, caller))]
    pub async fn get_blog_by_id(
        db: &PgPool,
        id: Uuid,
        caller: Option<&AuthPayload>,
    ) -> Result<BlogWithRelations, AppError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!("{} WHERE b.id = $1", BLOG_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Blog not found")))?;

        Self::single_with_relations(db, row, caller).await
    }

    #[instrument(skip(db, caller))]
    pub async fn get_blog_by_slug(
        db: &PgPool,
        slug: &str,
        caller: Option<&AuthPayload>,
    ) -> Result<BlogWithRelations, AppError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!("{} WHERE b.slug = $1", BLOG_SELECT))
            .bind(slug)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Blog not found")))?;

        Self::single_with_relations(db, row, caller).await
    }

    /// Re-slugs only when the title actually changes. `tag_ids`, when
    /// present, replaces the blog's tag set in the same transaction.
    #[instrument(skip(db, caller, dto), fields(caller_id = %caller.id))]
    pub async fn update_blog(
        db: &PgPool,
        caller: &AuthPayload,
        id: Uuid,
        dto: UpdateBlogDto,
    ) -> Result<BlogWithRelations, AppError> {
        let existing = Self::find_blog(db, id).await?;

        if existing.author_id != caller.id {
            return Err(AppError::forbidden(anyhow!(
                "Not authorized to update this blog"
            )));
        }

        let slug = match &dto.title {
            Some(title) if *title != existing.title => {
                ensure_unique(
                    &slugify(title),
                    Some(existing.slug.as_str()),
                    |candidate| slug_taken(db, candidate),
                )
                .await?
            }
            _ => existing.slug.clone(),
        };

        let (published, published_at) = next_published_state(&existing, dto.published);
        let status = dto.status.unwrap_or(existing.status);
        let category_id = dto.category_id.or(existing.category_id);

        let mut tx = db.begin().await?;

        sqlx::query(
            r#"UPDATE blogs
               SET title = $1, slug = $2, content = $3, excerpt = $4, featured_image = $5,
                   status = $6, published = $7, published_at = $8, category_id = $9,
                   updated_at = NOW()
               WHERE id = $10"#,
        )
        .bind(dto.title.unwrap_or(existing.title))
        .bind(&slug)
        .bind(dto.content.unwrap_or(existing.content))
        .bind(dto.excerpt.or(existing.excerpt))
        .bind(dto.featured_image.or(existing.featured_image))
        .bind(status.as_str())
        .bind(published)
        .bind(published_at)
        .bind(category_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = &dto.tag_ids {
            sqlx::query("DELETE FROM blog_tags WHERE blog_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_tags(&mut tx, id, tag_ids).await?;
        }

        tx.commit().await?;

        Self::get_blog_by_id(db, id, Some(caller)).await
    }

    #[instrument(skip(db, caller), fields(caller_id = %caller.id))]
    pub async fn delete_blog(db: &PgPool, caller: &AuthPayload, id: Uuid) -> Result<(), AppError> {
        let existing = Self::find_blog(db, id).await?;

        if existing.author_id != caller.id {
            return Err(AppError::forbidden(anyhow!(
                "Not authorized to delete this blog"
            )));
        }

        sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(blog_id = %id, "Blog deleted");
        Ok(())
    }

    /// Likes the blog, or removes the caller's existing like.
    #[instrument(skip(db, caller), fields(user_id = %caller.id))]
    pub async fn toggle_like(
        db: &PgPool,
        caller: &AuthPayload,
        blog_id: Uuid,
    ) -> Result<LikeResponse, AppError> {
        Self::find_blog(db, blog_id).await?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND blog_id = $2")
            .bind(caller.id)
            .bind(blog_id)
            .execute(db)
            .await?
            .rows_affected();

        if removed > 0 {
            return Ok(LikeResponse { liked: false });
        }

        sqlx::query(
            "INSERT INTO likes (user_id, blog_id) VALUES ($1, $2) ON CONFLICT (user_id, blog_id) DO NOTHING",
        )
        .bind(caller.id)
        .bind(blog_id)
        .execute(db)
        .await?;

        Ok(LikeResponse { liked: true })
    }

    async fn find_blog(db: &PgPool, id: Uuid) -> Result<Blog, AppError> {
        sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs WHERE id = $1", BLOG_COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Blog not found")))
    }

    async fn link_tags(
        tx: &mut Transaction<'_, Postgres>,
        blog_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), AppError> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"INSERT INTO blog_tags (blog_id, tag_id)
               SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS tag_id
               ON CONFLICT DO NOTHING"#,
        )
        .bind(blog_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn single_with_relations(
        db: &PgPool,
        row: BlogRow,
        caller: Option<&AuthPayload>,
    ) -> Result<BlogWithRelations, AppError> {
        Self::with_relations(db, vec![row], caller)
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(anyhow!("Blog not found")))
    }

    /// Attaches tags and, for an authenticated caller, `liked_by_me` to a
    /// page of blog rows, preserving their order.
    async fn with_relations(
        db: &PgPool,
        rows: Vec<BlogRow>,
        caller: Option<&AuthPayload>,
    ) -> Result<Vec<BlogWithRelations>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.blog.id).collect();

        let tag_rows = sqlx::query_as::<_, BlogTagRow>(
            r#"SELECT bt.blog_id, t.id, t.name, t.slug
               FROM blog_tags bt
               JOIN tags t ON t.id = bt.tag_id
               WHERE bt.blog_id = ANY($1)
               ORDER BY t.name ASC"#,
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        let mut tags: HashMap<Uuid, Vec<TagSummary>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.blog_id).or_default().push(TagSummary {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }

        let liked: Option<HashSet<Uuid>> = match caller {
            Some(caller) => {
                let liked_ids = sqlx::query_scalar::<_, Uuid>(
                    "SELECT blog_id FROM likes WHERE user_id = $1 AND blog_id = ANY($2)",
                )
                .bind(caller.id)
                .bind(&ids)
                .fetch_all(db)
                .await?;
                Some(liked_ids.into_iter().collect())
            }
            None => None,
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.blog.id;
                let mut blog =
                    BlogWithRelations::from_row(row, tags.remove(&id).unwrap_or_default());
                blog.liked_by_me = liked.as_ref().map(|set| set.contains(&id));
                blog
            })
            .collect())
    }
}
