#![allow(dead_code)]

//! In-memory collection store, the test double for `RecordStore`.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::store::{RecordStore, StoredRecord};

#[derive(Default)]
pub struct MemoryStore<T> {
    records: Mutex<Vec<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: StoredRecord + Clone + Send + Sync,
{
    async fn fetch_all(&self) -> Result<Vec<T>, AppError> {
        let records = self.records.lock().await;
        // Insertion order stands in for created_at: newest first.
        Ok(records.iter().rev().cloned().collect())
    }

    async fn save(&self, record: &T) -> Result<(), AppError> {
        let mut records = self.records.lock().await;
        match records
            .iter_mut()
            .find(|r| r.record_id() == record.record_id())
        {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete_all(&self, ids: &[String]) -> Result<(), AppError> {
        let mut records = self.records.lock().await;
        records.retain(|r| !ids.iter().any(|id| id == r.record_id()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.records.lock().await.clear();
        Ok(())
    }
}
