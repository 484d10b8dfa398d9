//! Persistence boundary: one key-value collection per document kind.
//!
//! The store is an injectable capability (fetch-all / save / delete-all /
//! clear) rather than a process-wide singleton, so handlers depend on
//! `Arc<dyn RecordStore<T>>` and tests swap in `MemoryStore`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::job::JobDescription;
use crate::models::resume::Resume;

/// A record addressable by its string id.
pub trait StoredRecord {
    fn record_id(&self) -> &str;
}

impl StoredRecord for Resume {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for JobDescription {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Collection store capability.
#[async_trait]
pub trait RecordStore<T>: Send + Sync {
    /// All records, newest first.
    async fn fetch_all(&self) -> Result<Vec<T>, AppError>;
    /// Upserts by id. The creation time is stamped on first write only.
    async fn save(&self, record: &T) -> Result<(), AppError>;
    async fn delete_all(&self, ids: &[String]) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}
