use color_eyre::Result;

use super::Db;
use crate::engine::QuizState;

impl Db {
    /// Load a browser's attempt state. Missing rows and unreadable state
    /// documents both come back as `None`; the caller starts fresh.
    pub async fn load_attempt(&self, token: &str) -> Result<Option<QuizState>> {
        let state: Option<String> = sqlx::query_scalar("SELECT state FROM attempts WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(json) = state else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable attempt state");
                Ok(None)
            }
        }
    }

    pub async fn save_attempt(&self, token: &str, state: &QuizState) -> Result<()> {
        let json = serde_json::to_string(state)?;

        sqlx::query(
            r#"
            INSERT INTO attempts (token, state, updated_at) VALUES (?, ?, datetime('now'))
            ON CONFLICT(token) DO UPDATE
            SET state = excluded.state, updated_at = excluded.updated_at
            "#,
        )
        .bind(token)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_attempt(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM attempts WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
