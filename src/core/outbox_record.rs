// The durable at-least-once delivery unit.
//
// Purpose
// - One row per raised event, inserted in the same transaction as the business
//   write that raised it, mutated only by the background publisher.
//
// Invariants
// - A record is pending iff processed_at is None.
// - retry_count only increases.
// - event_data always deserializes under the registered event_type; the store
//   treats it as opaque, only the serializer validates shape.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_type: String,
    pub event_data: String,
    pub occurred_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxRecord {
    pub fn new(
        event_id: Uuid,
        event_type: String,
        event_data: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            event_id,
            event_type,
            event_data,
            occurred_at,
            processed_at: None,
            error: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.processed_at.is_none()
    }
}

#[cfg(test)]
mod outbox_record_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_start_pending_with_a_zero_retry_count() {
        let record = OutboxRecord::new(
            Uuid::now_v7(),
            "user.registered.v1".to_string(),
            "{}".to_string(),
            Utc::now(),
        );
        assert!(record.is_pending());
        assert_eq!(record.retry_count, 0);
        assert_eq!(record.error, None);
    }
}
