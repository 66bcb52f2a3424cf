// Background outbox publisher.
//
// Responsibilities
// - Poll the outbox on a fixed interval, oldest records first, and push each
//   one to the broker keyed by its event id.
// - Success marks the record processed (idempotently). A transient broker
//   failure records the error and bumps retry_count; past the retry cap the
//   record is dead-lettered and removed from the outbox.
// - A payload that no longer decodes is a programmer error, not a transient
//   fault: it is dead-lettered immediately and never touches the retry counter.
// - Records in a batch are processed sequentially to keep per-aggregate order
//   and one broker round-trip in flight per process. Cancellation is observed
//   between records, so shutdown never leaves a half-updated row.
//
// Degrade mode
// - A process without broker wiring runs no loop at all: one warning, then a
//   clean exit, instead of a crash loop.

use std::time::Duration;

use chrono::Utc;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::serializer::{EventSerializer, SerializerError};
use crate::core::outbox_record::OutboxRecord;
use crate::core::ports::{
    BrokerMessage, BrokerPublisher, DeadLetterStore, MessageHeaders, OutboxStore, OutboxStoreError,
};
use crate::core::topics::topic_for;

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub poll_interval: Duration,
    pub batch_size: usize,
    /// A record whose retry_count exceeds this is dead-lettered.
    pub max_retries: i32,
    /// Source-system tag stamped on every published message.
    pub source_tag: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            batch_size: 100,
            max_retries: 5,
            source_tag: "event-relay".to_string(),
        }
    }
}

/// Everything the publisher needs wired to do useful work.
pub struct PublisherDeps {
    pub store: Arc<dyn OutboxStore>,
    pub dead_letters: Arc<dyn DeadLetterStore>,
    pub broker: Arc<dyn BrokerPublisher>,
    pub serializer: Arc<EventSerializer>,
}

pub struct OutboxPublisher {
    deps: Option<PublisherDeps>,
    config: PublisherConfig,
}

impl OutboxPublisher {
    pub fn new(deps: Option<PublisherDeps>, config: PublisherConfig) -> Self {
        Self { deps, config }
    }

    /// Long-lived poll loop. One loop per process; ticks never overlap.
    pub async fn run(&self, cancel: CancellationToken) {
        let Some(deps) = self.deps.as_ref() else {
            tracing::warn!(
                "no broker wiring configured, background event delivery is disabled"
            );
            return;
        };

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("outbox publisher stopping");
                    return;
                }
                _ = interval.tick() => {
                    // A store failure must not kill the loop; the next tick retries.
                    if let Err(err) = self.process_batch(deps, &cancel).await {
                        tracing::error!(error = %err, "outbox poll failed");
                    }
                }
            }
        }
    }

    /// Run a single poll/process cycle. `run` drives this from its interval;
    /// tests drive it directly.
    pub async fn tick(&self, cancel: &CancellationToken) -> Result<(), OutboxStoreError> {
        match self.deps.as_ref() {
            Some(deps) => self.process_batch(deps, cancel).await,
            None => Ok(()),
        }
    }

    async fn process_batch(
        &self,
        deps: &PublisherDeps,
        cancel: &CancellationToken,
    ) -> Result<(), OutboxStoreError> {
        let batch = deps.store.fetch_unprocessed(self.config.batch_size).await?;
        if batch.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = batch.len(), "processing outbox batch");
        for record in batch {
            if cancel.is_cancelled() {
                tracing::info!("cancellation observed mid-batch, abandoning remaining records");
                break;
            }
            self.process_record(deps, record).await?;
        }
        Ok(())
    }

    async fn process_record(
        &self,
        deps: &PublisherDeps,
        record: OutboxRecord,
    ) -> Result<(), OutboxStoreError> {
        if let Err(err) = deps
            .serializer
            .deserialize(&record.event_type, &record.event_data)
        {
            return self.reject_undecodable(deps, record, err).await;
        }

        let topic = topic_for(&record.event_type);
        let message = BrokerMessage {
            payload: record.event_data.clone(),
            headers: MessageHeaders {
                event_type: record.event_type.clone(),
                published_at: Utc::now(),
                source: self.config.source_tag.clone(),
            },
        };

        match deps
            .broker
            .publish(topic, &record.event_id.to_string(), message)
            .await
        {
            Ok(()) => {
                deps.store.mark_processed(record.id, Utc::now()).await?;
                tracing::debug!(
                    event_id = %record.event_id,
                    event_type = %record.event_type,
                    topic,
                    "event delivered"
                );
            }
            Err(err) => {
                let retries = deps.store.record_failure(record.id, &err.to_string()).await?;
                tracing::warn!(
                    event_id = %record.event_id,
                    event_type = %record.event_type,
                    retry_count = retries,
                    error = %err,
                    "broker publish failed"
                );
                if retries > self.config.max_retries {
                    tracing::error!(
                        event_id = %record.event_id,
                        event_type = %record.event_type,
                        retry_count = retries,
                        "retry budget exhausted, dead-lettering record"
                    );
                    let mut exhausted = record;
                    exhausted.retry_count = retries;
                    exhausted.error = Some(err.to_string());
                    deps.dead_letters.add(exhausted.clone()).await?;
                    deps.store.remove(exhausted.id).await?;
                }
            }
        }
        Ok(())
    }

    async fn reject_undecodable(
        &self,
        deps: &PublisherDeps,
        mut record: OutboxRecord,
        err: SerializerError,
    ) -> Result<(), OutboxStoreError> {
        tracing::error!(
            event_id = %record.event_id,
            event_type = %record.event_type,
            error = %err,
            "payload no longer decodes, dead-lettering record"
        );
        record.error = Some(err.to_string());
        deps.dead_letters.add(record.clone()).await?;
        deps.store.remove(record.id).await
    }
}
