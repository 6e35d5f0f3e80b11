use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use quillpress_config::PaginationConfig;
use quillpress_core::{AppError, Paginated, ensure_unique, slugify};
use quillpress_models::categories::{
    Category, CategoryFilterParams, CategoryWithCount, CreateCategoryDto, UpdateCategoryDto,
};

const CATEGORY_COLUMNS: &str = "id, name, description, slug, created_at, updated_at";

const CATEGORY_SELECT: &str = r#"SELECT
        c.id,
        c.name,
        c.description,
        c.slug,
        c.created_at,
        c.updated_at,
        (SELECT COUNT(*) FROM blogs b WHERE b.category_id = c.id) AS blog_count
    FROM categories c"#;

async fn slug_taken(db: &PgPool, slug: String) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
        .bind(slug)
        .fetch_one(db)
        .await
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db))]
    pub async fn create_category(
        db: &PgPool,
        dto: CreateCategoryDto,
    ) -> Result<Category, AppError> {
        let slug = ensure_unique(&slugify(&dto.name), None, |candidate| {
            slug_taken(db, candidate)
        })
        .await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, description, slug) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&slug)
        .fetch_one(db)
        .await?;

        info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    #[instrument(skip(db))]
    pub async fn get_categories(
        db: &PgPool,
        pagination: &PaginationConfig,
        filters: CategoryFilterParams,
    ) -> Result<Paginated<CategoryWithCount>, AppError> {
        let window = filters
            .pagination
            .window(pagination.default_limit, pagination.max_limit);
        let predicate = filters.predicate();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories c");
        predicate.push_where(&mut count_query);

        let mut data_query = QueryBuilder::<Postgres>::new(CATEGORY_SELECT);
        predicate.push_where(&mut data_query);
        data_query
            .push(" ORDER BY c.name ASC LIMIT ")
            .push_bind(window.take)
            .push(" OFFSET ")
            .push_bind(window.skip);

        let (total, categories) = tokio::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(db),
            data_query
                .build_query_as::<CategoryWithCount>()
                .fetch_all(db),
        )?;

        Ok(window.into_page(categories, total))
    }

    #[instrument(skip(db))]
    pub async fn get_category_by_id(db: &PgPool, id: Uuid) -> Result<CategoryWithCount, AppError> {
        sqlx::query_as::<_, CategoryWithCount>(&format!("{} WHERE c.id = $1", CATEGORY_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Category not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_category_by_slug(
        db: &PgPool,
        slug: &str,
    ) -> Result<CategoryWithCount, AppError> {
        sqlx::query_as::<_, CategoryWithCount>(&format!("{} WHERE c.slug = $1", CATEGORY_SELECT))
            .bind(slug)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Category not found")))
    }

    /// A supplied name always regenerates the slug; the category's own
    /// current slug does not count as a collision.
    #[instrument(skip(db))]
    pub async fn update_category(
        db: &PgPool,
        id: Uuid,
        dto: UpdateCategoryDto,
    ) -> Result<Category, AppError> {
        let existing = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Category not found")))?;

        let (name, slug) = match dto.name {
            Some(name) => {
                let slug = ensure_unique(
                    &slugify(&name),
                    Some(existing.slug.as_str()),
                    |candidate| slug_taken(db, candidate),
                )
                .await?;
                (name, slug)
            }
            None => (existing.name, existing.slug),
        };
        let description = dto.description.or(existing.description);

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"UPDATE categories
               SET name = $1, description = $2, slug = $3, updated_at = NOW()
               WHERE id = $4
               RETURNING {}"#,
            CATEGORY_COLUMNS
        ))
        .bind(&name)
        .bind(&description)
        .bind(&slug)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(category)
    }

    /// Blogs in the category keep existing with no category.
    #[instrument(skip(db))]
    pub async fn delete_category(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Category not found")));
        }

        Ok(())
    }
}
