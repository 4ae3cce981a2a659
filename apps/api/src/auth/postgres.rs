use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::auth::AuthProvider;
use crate::errors::AppError;
use crate::models::user::AuthUser;

/// Sessions stored in PostgreSQL.
///
/// Table `user_sessions`: token, user_id, expires_at; joined to `users` for the email.
#[derive(Clone)]
pub struct PgSessionAuth {
    pool: PgPool,
}

impl PgSessionAuth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthProvider for PgSessionAuth {
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AppError> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT u.id AS user_id, u.email, s.token
            FROM user_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => Ok(user),
            None => {
                debug!("Rejected unknown or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }

    async fn ensure_valid_session(&self, user: &AuthUser) -> Result<bool, AppError> {
        let valid: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_sessions
                WHERE token = $1 AND user_id = $2 AND expires_at > NOW()
            )
            "#,
        )
        .bind(&user.token)
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(valid)
    }
}
