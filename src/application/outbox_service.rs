// Write-side outbox API.
//
// Responsibilities
// - Translate a batch of raised events into outbox records and add them to the
//   persistence context. Does not publish and does not commit; commit stays
//   with the unit of work, which is what gives the atomicity guarantee.
// - Serialize the whole batch before touching the store: one bad event fails
//   the batch (and with it the business transaction) instead of silently
//   dropping the rest.

use std::sync::Arc;

use crate::application::errors::ApplicationError;
use crate::application::serializer::EventSerializer;
use crate::core::event::EventEnvelope;
use crate::core::outbox_record::OutboxRecord;
use crate::core::ports::OutboxStore;

pub struct OutboxService {
    store: Arc<dyn OutboxStore>,
    serializer: Arc<EventSerializer>,
}

impl OutboxService {
    pub fn new(store: Arc<dyn OutboxStore>, serializer: Arc<EventSerializer>) -> Self {
        Self { store, serializer }
    }

    pub async fn save_domain_events(
        &self,
        events: &[EventEnvelope],
    ) -> Result<(), ApplicationError> {
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let data = self.serializer.serialize(&event.payload)?;
            records.push(OutboxRecord::new(
                event.event_id,
                event.event_type().to_string(),
                data,
                event.occurred_at,
            ));
        }
        if records.is_empty() {
            return Ok(());
        }
        self.store.add_batch(records).await?;
        Ok(())
    }
}

#[cfg(test)]
mod outbox_service_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_outbox_store::InMemoryOutboxStore;
    use crate::core::event::v1::role_assigned::RoleAssignedV1;
    use crate::core::event::EventPayload;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> Arc<InMemoryOutboxStore> {
        Arc::new(InMemoryOutboxStore::new())
    }

    fn role_assigned() -> EventEnvelope {
        EventEnvelope::new(EventPayload::RoleAssigned(RoleAssignedV1 {
            user_id: "user-fixed-0001".to_string(),
            role_id: "role-admin".to_string(),
            assigned_by: "user-fixed-0002".to_string(),
            assigned_at: 1_700_000_000_000,
        }))
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_persist_one_pending_record_per_event(store: Arc<InMemoryOutboxStore>) {
        let service = OutboxService::new(
            store.clone(),
            Arc::new(EventSerializer::with_known_events()),
        );
        let events = vec![role_assigned(), role_assigned()];
        service.save_domain_events(&events).await.unwrap();

        let rows = store.pending().await;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.is_pending() && r.retry_count == 0));
        assert_eq!(rows[0].event_id, events[0].event_id);
        assert_eq!(rows[0].event_type, "role.assigned.v1");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_touch_the_store_for_an_empty_batch(store: Arc<InMemoryOutboxStore>) {
        let service = OutboxService::new(
            store.clone(),
            Arc::new(EventSerializer::with_known_events()),
        );
        service.save_domain_events(&[]).await.unwrap();
        assert!(store.pending().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_a_store_failure(store: Arc<InMemoryOutboxStore>) {
        store.toggle_offline();
        let service = OutboxService::new(
            store.clone(),
            Arc::new(EventSerializer::with_known_events()),
        );
        let result = service.save_domain_events(&[role_assigned()]).await;
        assert!(matches!(result, Err(ApplicationError::Outbox(_))));
    }
}
