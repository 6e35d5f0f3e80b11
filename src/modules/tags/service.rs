use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use quillpress_config::PaginationConfig;
use quillpress_core::{AppError, Paginated, ensure_unique, slugify};
use quillpress_models::tags::{CreateTagDto, Tag, TagFilterParams, TagWithCount, UpdateTagDto};

const TAG_COLUMNS: &str = "id, name, slug, created_at, updated_at";

const TAG_SELECT: &str = r#"SELECT
        t.id,
        t.name,
        t.slug,
        t.created_at,
        t.updated_at,
        (SELECT COUNT(*) FROM blog_tags bt WHERE bt.tag_id = t.id) AS blog_count
    FROM tags t"#;

async fn slug_taken(db: &PgPool, slug: String) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tags WHERE slug = $1)")
        .bind(slug)
        .fetch_one(db)
        .await
}

pub struct TagService;

impl TagService {
    #[instrument(skip(db))]
    pub async fn create_tag(db: &PgPool, dto: CreateTagDto) -> Result<Tag, AppError> {
        let slug = ensure_unique(&slugify(&dto.name), None, |candidate| {
            slug_taken(db, candidate)
        })
        .await?;

        let tag = sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING {}",
            TAG_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&slug)
        .fetch_one(db)
        .await?;

        info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    #[instrument(skip(db))]
    pub async fn get_tags(
        db: &PgPool,
        pagination: &PaginationConfig,
        filters: TagFilterParams,
    ) -> Result<Paginated<TagWithCount>, AppError> {
        let window = filters
            .pagination
            .window(pagination.default_limit, pagination.max_limit);
        let predicate = filters.predicate();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tags t");
        predicate.push_where(&mut count_query);

        let mut data_query = QueryBuilder::<Postgres>::new(TAG_SELECT);
        predicate.push_where(&mut data_query);
        data_query
            .push(" ORDER BY t.name ASC LIMIT ")
            .push_bind(window.take)
            .push(" OFFSET ")
            .push_bind(window.skip);

        let (total, tags) = tokio::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(db),
            data_query.build_query_as::<TagWithCount>().fetch_all(db),
        )?;

        Ok(window.into_page(tags, total))
    }

    #[instrument(skip(db))]
    pub async fn get_tag_by_id(db: &PgPool, id: Uuid) -> Result<TagWithCount, AppError> {
        sqlx::query_as::<_, TagWithCount>(&format!("{} WHERE t.id = $1", TAG_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Tag not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_tag_by_slug(db: &PgPool, slug: &str) -> Result<TagWithCount, AppError> {
        sqlx::query_as::<_, TagWithCount>(&format!("{} WHERE t.slug = $1", TAG_SELECT))
            .bind(slug)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Tag not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_tag(db: &PgPool, id: Uuid, dto: UpdateTagDto) -> Result<Tag, AppError> {
        let existing = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE id = $1",
            TAG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Tag not found")))?;

        let Some(name) = dto.name else {
            return Ok(existing);
        };

        let slug = ensure_unique(
            &slugify(&name),
            Some(existing.slug.as_str()),
            |candidate| slug_taken(db, candidate),
        )
        .await?;

        let tag = sqlx::query_as::<_, Tag>(&format!(
            r#"UPDATE tags
               SET name = $1, slug = $2, updated_at = NOW()
               WHERE id = $3
               RETURNING {}"#,
            TAG_COLUMNS
        ))
        .bind(&name)
        .bind(&slug)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(tag)
    }

    /// Removes the tag from every blog carrying it.
    #[instrument(skip(db))]
    pub async fn delete_tag(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Tag not found")));
        }

        Ok(())
    }
}
