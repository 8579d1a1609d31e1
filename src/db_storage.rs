use crate::errors::{AppError, ResultExt};
use serde_json::Value;
use sqlx::PgPool;

/// One persisted D&B Direct+ response.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredProduct {
    pub duns: String,
    pub dbs: Option<Value>,
    /// Unix epoch milliseconds of the request.
    pub dbs_obtained_at: Option<i64>,
    pub dbs_http_status: Option<i16>,
}

/// Storage of data blocks responses in `products_dnb`, one row per DUNS.
pub struct DataBlockStorage {
    pool: PgPool,
}

impl DataBlockStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_table(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS public.products_dnb (
                duns character varying(9),
                dbs JSONB,
                dbs_obtained_at bigint,
                dbs_http_status smallint,
                CONSTRAINT products_dnb_pkey PRIMARY KEY (duns)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating table products_dnb")?;

        Ok(())
    }

    /// Inserts or replaces the response stored for `duns`.
    pub async fn upsert(
        &self,
        duns: &str,
        dbs: &Value,
        obtained_at: i64,
        http_status: i16,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO products_dnb (duns, dbs, dbs_obtained_at, dbs_http_status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (duns) DO UPDATE SET
                dbs = EXCLUDED.dbs,
                dbs_obtained_at = EXCLUDED.dbs_obtained_at,
                dbs_http_status = EXCLUDED.dbs_http_status
            "#,
        )
        .bind(duns)
        .bind(dbs)
        .bind(obtained_at)
        .bind(http_status)
        .execute(&self.pool)
        .await
        .with_context(|| format!("storing data blocks for DUNS {}", duns))?;

        tracing::debug!("✓ Stored data blocks for DUNS {}", duns);
        Ok(())
    }

    pub async fn fetch_one(&self, duns: &str) -> Result<Option<StoredProduct>, AppError> {
        let product = sqlx::query_as::<_, StoredProduct>(
            "SELECT duns, dbs, dbs_obtained_at, dbs_http_status FROM products_dnb WHERE duns = $1",
        )
        .bind(duns)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("loading data blocks for DUNS {}", duns))?;

        Ok(product)
    }

    /// Every stored response, ordered by DUNS.
    pub async fn fetch_all(&self) -> Result<Vec<StoredProduct>, AppError> {
        let products = sqlx::query_as::<_, StoredProduct>(
            "SELECT duns, dbs, dbs_obtained_at, dbs_http_status FROM products_dnb ORDER BY duns",
        )
        .fetch_all(&self.pool)
        .await
        .context("loading stored data blocks")?;

        Ok(products)
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM products_dnb")
            .execute(&self.pool)
            .await
            .context("deleting stored data blocks")?;

        Ok(result.rows_affected())
    }
}
