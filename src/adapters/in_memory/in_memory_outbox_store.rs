// In memory implementation of the OutboxStore and DeadLetterStore ports.
//
// Purpose
// - Support publisher and dispatcher tests and local development without a database.
//
// Responsibilities
// - Keep outbox rows in memory with the same invariants a relational adapter
//   enforces: atomic batch insert, idempotent processed marking, monotone
//   retry counter.
// - The offline toggle simulates a backend outage for failure-path tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::outbox_record::OutboxRecord;
use crate::core::ports::{DeadLetterStore, OutboxStore, OutboxStoreError};

#[derive(Default)]
pub struct InMemoryOutboxStore {
    rows: Mutex<Vec<OutboxRecord>>,
    dead_letters: Mutex<Vec<OutboxRecord>>,
    offline: AtomicBool,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), OutboxStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(OutboxStoreError::Backend("outbox store offline".to_string()));
        }
        Ok(())
    }

    pub async fn pending(&self) -> Vec<OutboxRecord> {
        let guard = self.rows.lock().await;
        guard.iter().filter(|r| r.is_pending()).cloned().collect()
    }

    pub async fn all_rows(&self) -> Vec<OutboxRecord> {
        self.rows.lock().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<OutboxRecord> {
        let guard = self.rows.lock().await;
        guard.iter().find(|r| r.id == id).cloned()
    }

    pub async fn dead_lettered(&self) -> Vec<OutboxRecord> {
        self.dead_letters.lock().await.clone()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn add_batch(&self, records: Vec<OutboxRecord>) -> Result<(), OutboxStoreError> {
        self.check_online()?;
        // Single lock acquisition: the batch lands whole or not at all.
        let mut guard = self.rows.lock().await;
        guard.extend(records);
        Ok(())
    }

    async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<OutboxRecord>, OutboxStoreError> {
        self.check_online()?;
        let guard = self.rows.lock().await;
        let mut pending: Vec<OutboxRecord> =
            guard.iter().filter(|r| r.is_pending()).cloned().collect();
        pending.sort_by_key(|r| r.occurred_at);
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_processed(
        &self,
        id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), OutboxStoreError> {
        self.check_online()?;
        let mut guard = self.rows.lock().await;
        let record = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OutboxStoreError::NotFound(id))?;
        if record.processed_at.is_some() {
            return Ok(());
        }
        record.processed_at = Some(processed_at);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn record_failure(&self, id: Uuid, error: &str) -> Result<i32, OutboxStoreError> {
        self.check_online()?;
        let mut guard = self.rows.lock().await;
        let record = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OutboxStoreError::NotFound(id))?;
        record.retry_count += 1;
        record.error = Some(error.to_string());
        record.updated_at = Utc::now();
        Ok(record.retry_count)
    }

    async fn remove(&self, id: Uuid) -> Result<(), OutboxStoreError> {
        self.check_online()?;
        let mut guard = self.rows.lock().await;
        guard.retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait]
impl DeadLetterStore for InMemoryOutboxStore {
    async fn add(&self, record: OutboxRecord) -> Result<(), OutboxStoreError> {
        self.check_online()?;
        self.dead_letters.lock().await.push(record);
        Ok(())
    }
}
