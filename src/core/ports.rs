// Ports define what the delivery core needs from the outside world, without implementing it.
//
// Purpose
// - Describe abstract input and output capabilities as traits (for example: OutboxStore, BrokerPublisher).
//
// Responsibilities
// - Keep the core independent of any database or broker by coding against traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - Provide in memory implementations for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::core::event::EventEnvelope;
use crate::core::outbox_record::OutboxRecord;

#[derive(Debug, Error)]
pub enum OutboxStoreError {
    #[error("outbox record {0} not found")]
    NotFound(Uuid),

    #[error("transient backend error: {0}")]
    Transient(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Insert a batch of records atomically: either every record lands or none do.
    ///
    /// Implementations must bind the insert to the caller's open business
    /// transaction so no event row can outlive a rolled-back business write
    /// and no business commit silently drops its events.
    async fn add_batch(&self, records: Vec<OutboxRecord>) -> Result<(), OutboxStoreError>;

    /// Pending records (processed_at is null), ordered by occurred_at ascending.
    async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<OutboxRecord>, OutboxStoreError>;

    /// Confirm delivery. Idempotent: an already-processed record keeps its
    /// original timestamp and the call is a no-op.
    async fn mark_processed(
        &self,
        id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), OutboxStoreError>;

    /// Record a failed delivery attempt: overwrite the last error and
    /// increment retry_count. Returns the new count.
    async fn record_failure(&self, id: Uuid, error: &str) -> Result<i32, OutboxStoreError>;

    async fn remove(&self, id: Uuid) -> Result<(), OutboxStoreError>;
}

/// Append-only parking lot for records whose retry budget is exhausted or
/// whose payload can no longer be decoded. Nothing is ever erased for good.
#[async_trait]
pub trait DeadLetterStore: Send + Sync {
    async fn add(&self, record: OutboxRecord) -> Result<(), OutboxStoreError>;
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("transient broker failure: {0}")]
    Transient(String),

    #[error("broker rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeaders {
    pub event_type: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrokerMessage {
    pub payload: String,
    pub headers: MessageHeaders,
}

/// Delivers one message to one topic, keyed for deterministic partitioning
/// downstream. Failures surface to the caller, which owns retry bookkeeping;
/// the publisher knows nothing about the outbox.
#[async_trait]
pub trait BrokerPublisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        message: BrokerMessage,
    ) -> Result<(), BrokerError>;
}

/// In-process handler for critical events. Handlers of the same event are
/// assumed independent and side-effect-isolated; the dispatcher runs them
/// concurrently.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()>;
}
