use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub const RESUMES_TABLE: &str = "resumes";
pub const JOBS_TABLE: &str = "job_descriptions";

/// Creates the PostgreSQL connection pool and bootstraps the collection
/// tables. Records are stored whole as JSONB, keyed by their string id;
/// `created_at` orders `fetch_all` by recency and keeps its first-write
/// value across upserts.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    for table in [RESUMES_TABLE, JOBS_TABLE] {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ))
        .execute(&pool)
        .await?;
    }

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
