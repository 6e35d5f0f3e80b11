use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use quillpress_auth::{AuthPayload, create_token};
use quillpress_config::JwtConfig;
use quillpress_core::{AppError, hash_password, verify_password};
use quillpress_models::auth::{AuthResponse, LoginRequest, RegisterRequest};
use quillpress_models::users::{User, UserCredentials};

use crate::metrics::{track_login, track_user_registered};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config, dto), fields(email = %dto.email, username = %dto.username))]
    pub async fn register(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: RegisterRequest,
    ) -> Result<AuthResponse, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(&dto.email)
        .bind(&dto.username)
        .fetch_one(db)
        .await?;

        if taken {
            return Err(AppError::duplicate(anyhow!(
                "A user with this email or username already exists"
            )));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (email, username, password)
               VALUES ($1, $2, $3)
               RETURNING id, email, username, created_at, updated_at"#,
        )
        .bind(&dto.email)
        .bind(&dto.username)
        .bind(&hashed_password)
        .fetch_one(db)
        .await?;

        let token = create_token(&payload_for(&user), jwt_config)?;

        track_user_registered();
        info!(user_id = %user.id, "User registered");

        Ok(AuthResponse { user, token })
    }

    #[instrument(skip(db, jwt_config, dto), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, username, password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            track_login(false);
            warn!("Login failed: unknown email");
            return Err(AppError::unauthorized(anyhow!("Invalid credentials")));
        };

        if !verify_password(&dto.password, &credentials.password)? {
            track_login(false);
            warn!(user_id = %credentials.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(anyhow!("Invalid credentials")));
        }

        let user = credentials.into_user();
        let token = create_token(&payload_for(&user), jwt_config)?;

        track_login(true);

        Ok(AuthResponse { user, token })
    }
}

fn payload_for(user: &User) -> AuthPayload {
    AuthPayload {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    }
}
