use color_eyre::Result;

use super::models::DashboardCounts;
use super::Db;

impl Db {
    /// The three dashboard cards in one query.
    pub async fn dashboard_counts(&self) -> Result<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM questions) AS total_questions,
                (SELECT COUNT(*) FROM players) AS total_players,
                (SELECT COUNT(*) FROM players
                 WHERE last_active > datetime('now', '-24 hours')) AS active_players
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
