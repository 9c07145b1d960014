use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth_domain::errors::AuthError;
use crate::auth_domain::models::ConfirmationToken;
use crate::auth_domain::models::UserId;
use crate::auth_domain::ports::ConfirmationTokenStore;

/// Postgres-backed store for confirmation tokens.
///
/// Rows are insert-and-update only; expired and confirmed tokens remain in
/// the table for audit.
pub struct PostgresConfirmationTokenStore {
    pool: PgPool,
}

impl PostgresConfirmationTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConfirmationTokenRow {
    id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    user_id: Uuid,
}

impl From<ConfirmationTokenRow> for ConfirmationToken {
    fn from(row: ConfirmationTokenRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            confirmed_at: row.confirmed_at,
            user_id: UserId(row.user_id),
        }
    }
}

#[async_trait]
impl ConfirmationTokenStore for PostgresConfirmationTokenStore {
    async fn insert(&self, token: ConfirmationToken) -> Result<ConfirmationToken, AuthError> {
        sqlx::query(
            r#"
            INSERT INTO confirmation_tokens (id, token, expires_at, confirmed_at, user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.confirmed_at)
        .bind(token.user_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ConfirmationToken>, AuthError> {
        let row = sqlx::query_as::<_, ConfirmationTokenRow>(
            r#"
            SELECT id, token, expires_at, confirmed_at, user_id
            FROM confirmation_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(row.map(ConfirmationToken::from))
    }

    async fn mark_confirmed(
        &self,
        id: Uuid,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE confirmation_tokens
            SET confirmed_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(confirmed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::TokenNotFound);
        }

        Ok(())
    }
}
