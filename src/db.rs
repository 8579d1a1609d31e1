use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        // Fail fast when the server is unreachable
        sqlx::query("SELECT 1").execute(&pool).await?;
        tracing::info!("✓ Connected to Postgres");

        Ok(Self { pool })
    }
}
