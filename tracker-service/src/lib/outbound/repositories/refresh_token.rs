use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth_domain::errors::AuthError;
use crate::auth_domain::models::RefreshToken;
use crate::auth_domain::models::UserId;
use crate::auth_domain::ports::RefreshTokenStore;

/// Postgres-backed store for refresh tokens.
pub struct PostgresRefreshTokenStore {
    pool: PgPool,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    user_id: Uuid,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            user_id: UserId(row.user_id),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
        // Delete-then-insert runs in one transaction so concurrent logins for
        // the same user cannot both survive: the row locks taken by the
        // delete serialize the two replacements, last writer wins.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(token.user_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, token, expires_at, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.user_id.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, token, expires_at, user_id
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(row.map(RefreshToken::from))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_by_user(&self, user_id: &UserId) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }
}
