//! PostgreSQL-backed collection stores.
//!
//! Records are stored whole as JSONB rows keyed by their string id. Writes
//! are best-effort per record; there are no cross-record transaction
//! guarantees.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{JOBS_TABLE, RESUMES_TABLE};
use crate::errors::AppError;
use crate::models::job::JobDescription;
use crate::models::resume::Resume;
use crate::store::{RecordStore, StoredRecord};

pub struct PgStore<T> {
    pool: PgPool,
    table: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl PgStore<Resume> {
    pub fn resumes(pool: PgPool) -> Self {
        Self {
            pool,
            table: RESUMES_TABLE,
            _record: PhantomData,
        }
    }
}

impl PgStore<JobDescription> {
    pub fn jobs(pool: PgPool) -> Self {
        Self {
            pool,
            table: JOBS_TABLE,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for PgStore<T>
where
    T: StoredRecord + Serialize + DeserializeOwned + Send + Sync,
{
    async fn fetch_all(&self) -> Result<Vec<T>, AppError> {
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(&format!(
            "SELECT data FROM {} ORDER BY created_at DESC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|data| {
                serde_json::from_value(data).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "corrupt record in {}: {e}",
                        self.table
                    ))
                })
            })
            .collect()
    }

    async fn save(&self, record: &T) -> Result<(), AppError> {
        let data = serde_json::to_value(record)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode record: {e}")))?;

        // created_at keeps its first-write value across upserts.
        sqlx::query(&format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
            self.table
        ))
        .bind(record.record_id())
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all(&self, ids: &[String]) -> Result<(), AppError> {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ANY($1)", self.table))
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
