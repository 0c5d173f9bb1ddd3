//! Postgres session repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::{RepositoryError, SessionRepository};
use crate::runtime::SessionState;

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// When the user's state was last saved
    pub async fn updated_at(&self, user_id: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let updated_at = sqlx::query_scalar(
            "SELECT updated_at FROM session_states WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated_at)
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn load(&self, user_id: &str) -> Result<Option<SessionState>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT state
            FROM session_states
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let state: serde_json::Value = row.get("state");
                Ok(Some(serde_json::from_value(state)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: &str, state: &SessionState) -> Result<(), RepositoryError> {
        let state = serde_json::to_value(state)?;

        sqlx::query(
            r#"
            INSERT INTO session_states (user_id, state, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(state)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM session_states WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
