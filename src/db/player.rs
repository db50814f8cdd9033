use color_eyre::Result;

use super::models::{LeaderboardEntry, PlayerRow};
use super::Db;
use crate::names;

impl Db {
    /// Create the player row on first contact and keep `last_active` fresh.
    /// Never touches the stored score.
    pub async fn touch_player(&self, public_id: &str, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO players (public_id, name, last_active) VALUES (?, ?, datetime('now'))
            ON CONFLICT(public_id) DO UPDATE
            SET name = excluded.name, last_active = excluded.last_active
            "#,
        )
        .bind(public_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create-or-merge the player's leaderboard entry with a finished
    /// attempt's score. The latest finished attempt wins.
    pub async fn record_score(&self, public_id: &str, name: &str, score: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO players (public_id, name, score, last_active) VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(public_id) DO UPDATE
            SET name = excluded.name, score = excluded.score, last_active = excluded.last_active
            "#,
        )
        .bind(public_id)
        .bind(name)
        .bind(score)
        .execute(&self.pool)
        .await?;

        tracing::info!(player = public_id, score, "recorded quiz score");
        Ok(())
    }

    /// Top players by score; among equal scores the most recently updated
    /// entry ranks first.
    pub async fn top_players(&self) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT public_id, name, score FROM players
            ORDER BY score DESC, last_active DESC
            LIMIT ?
            "#,
        )
        .bind(names::LEADERBOARD_SIZE)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_players(&self) -> Result<Vec<PlayerRow>> {
        let players = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, public_id, name, email, score, last_active
            FROM players ORDER BY last_active DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    /// Players seen in the last 24 hours.
    pub async fn list_active_players(&self) -> Result<Vec<PlayerRow>> {
        let players = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, public_id, name, email, score, last_active
            FROM players
            WHERE last_active > datetime('now', '-24 hours')
            ORDER BY last_active DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }
}
