use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use quillpress_auth::AuthPayload;
use quillpress_config::PaginationConfig;
use quillpress_core::{AppError, Paginated};
use quillpress_models::users::{
    Profile, UpsertProfileDto, UserDetail, UserFilterParams, UserWithCounts,
};

const USER_SELECT: &str = r#"SELECT
        u.id,
        u.email,
        u.username,
        u.created_at,
        u.updated_at,
        (SELECT COUNT(*) FROM blogs b WHERE b.author_id = u.id) AS blog_count,
        (SELECT COUNT(*) FROM comments c WHERE c.author_id = u.id) AS comment_count,
        (SELECT COUNT(*) FROM likes l WHERE l.user_id = u.id) AS like_count
    FROM users u"#;

const PROFILE_COLUMNS: &str = "id, user_id, first_name, last_name, bio, avatar, website, location, created_at, updated_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_users(
        db: &PgPool,
        pagination: &PaginationConfig,
        filters: UserFilterParams,
    ) -> Result<Paginated<UserDetail>, AppError> {
        let window = filters
            .pagination
            .window(pagination.default_limit, pagination.max_limit);
        let predicate = filters.predicate();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u");
        predicate.push_where(&mut count_query);

        let mut data_query = QueryBuilder::<Postgres>::new(USER_SELECT);
        predicate.push_where(&mut data_query);
        data_query
            .push(" ORDER BY u.created_at DESC LIMIT ")
            .push_bind(window.take)
            .push(" OFFSET ")
            .push_bind(window.skip);

        let (total, rows) = tokio::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(db),
            data_query.build_query_as::<UserWithCounts>().fetch_all(db),
        )?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.user.id).collect();
        let mut profiles = Self::profiles_for(db, &ids).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let profile = profiles.remove(&row.user.id);
                UserDetail::new(row, profile)
            })
            .collect();

        Ok(window.into_page(data, total))
    }

    #[instrument(skip(db))]
    pub async fn get_user_by_id(db: &PgPool, id: Uuid) -> Result<UserDetail, AppError> {
        let row = sqlx::query_as::<_, UserWithCounts>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let profile = Self::profile_for(db, row.user.id).await?;
        Ok(UserDetail::new(row, profile))
    }

    #[instrument(skip(db))]
    pub async fn get_user_by_username(db: &PgPool, username: &str) -> Result<UserDetail, AppError> {
        let row = sqlx::query_as::<_, UserWithCounts>(&format!(
            "{} WHERE u.username = $1",
            USER_SELECT
        ))
        .bind(username)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let profile = Self::profile_for(db, row.user.id).await?;
        Ok(UserDetail::new(row, profile))
    }

    /// Deletes the caller's own account; everything they own cascades.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, caller: &AuthPayload, id: Uuid) -> Result<(), AppError> {
        if caller.id != id {
            return Err(AppError::forbidden(anyhow!(
                "You can only delete your own account"
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        Ok(())
    }

    /// Creates the profile on first call, replaces it afterwards.
    #[instrument(skip(db, dto))]
    pub async fn upsert_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpsertProfileDto,
    ) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"INSERT INTO profiles (user_id, first_name, last_name, bio, avatar, website, location)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (user_id) DO UPDATE SET
                   first_name = EXCLUDED.first_name,
                   last_name = EXCLUDED.last_name,
                   bio = EXCLUDED.bio,
                   avatar = EXCLUDED.avatar,
                   website = EXCLUDED.website,
                   location = EXCLUDED.location,
                   updated_at = NOW()
               RETURNING {}"#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.bio)
        .bind(&dto.avatar)
        .bind(&dto.website)
        .bind(&dto.location)
        .fetch_one(db)
        .await?;

        Ok(profile)
    }

    async fn profile_for(db: &PgPool, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(profile)
    }

    async fn profiles_for(
        db: &PgPool,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Profile>, AppError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        ))
        .bind(user_ids)
        .fetch_all(db)
        .await?;

        Ok(profiles.into_iter().map(|p| (p.user_id, p)).collect())
    }
}
