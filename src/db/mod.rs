pub mod models;

mod account;
mod admin;
mod attempt;
mod migrations;
mod player;
mod question;

use color_eyre::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn new(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        // Verify the connection before doing anything else.
        sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await?;

        migrations::run(&pool).await?;

        tracing::info!(path, "database ready");

        Ok(Self { pool })
    }
}
