// Hybrid dispatcher: the orchestration point after a unit of work commits.
//
// Responsibilities
// - Partition the raised events into critical vs deferred/regular.
// - Critical: run registered in-process handlers now, ordered across events by
//   priority, fanned out concurrently within one event. A handler failure is
//   never propagated to the caller; the whole critical batch is written to the
//   outbox for asynchronous retry instead.
// - Deferred and regular: hand the batch to the outbox service for durable
//   persistence inside the caller's transaction.
//
// The handler table is assembled explicitly at startup; every event type's
// handler set is known at compile time through the closed payload enumeration.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::application::errors::ApplicationError;
use crate::application::outbox_service::OutboxService;
use crate::core::event::{EventClass, EventEnvelope};
use crate::core::ports::EventHandler;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event_type: &'static str, handler: Arc<dyn EventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    pub fn handlers_for(&self, event_type: &str) -> &[Arc<dyn EventHandler>] {
        self.handlers
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

pub struct HybridDispatcher {
    registry: Arc<HandlerRegistry>,
    outbox: Arc<OutboxService>,
}

impl HybridDispatcher {
    pub fn new(registry: Arc<HandlerRegistry>, outbox: Arc<OutboxService>) -> Self {
        Self { registry, outbox }
    }

    /// Called once per unit-of-work commit with every event raised during it.
    pub async fn dispatch(&self, events: Vec<EventEnvelope>) -> Result<(), ApplicationError> {
        let (mut critical, deferred): (Vec<_>, Vec<_>) = events
            .into_iter()
            .partition(|event| event.classification() == EventClass::Critical);
        critical.sort_by_key(EventEnvelope::priority);

        if !critical.is_empty() && !self.run_critical(&critical).await {
            // A failed synchronous pass becomes eventual consistency, never a
            // lost event and never an error on the triggering operation.
            self.outbox.save_domain_events(&critical).await?;
        }

        if !deferred.is_empty() {
            self.outbox.save_domain_events(&deferred).await?;
        }
        Ok(())
    }

    /// Run the synchronous pass in priority order. Handlers of one event run
    /// concurrently; event N+1 does not start before event N's set completes.
    /// Returns false on the first handler failure.
    async fn run_critical(&self, events: &[EventEnvelope]) -> bool {
        for event in events {
            let handlers = self.registry.handlers_for(event.event_type());
            let results = join_all(handlers.iter().map(|handler| handler.handle(event))).await;
            for result in results {
                if let Err(err) = result {
                    tracing::error!(
                        event_type = event.event_type(),
                        event_id = %event.event_id,
                        error = %err,
                        "critical handler failed, falling back to the outbox"
                    );
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod handler_registry_tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;

    struct NoopHandler;

    #[async_trait]
    impl EventHandler for NoopHandler {
        async fn handle(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn it_should_resolve_every_handler_registered_for_a_type() {
        let mut registry = HandlerRegistry::new();
        registry.register("user.registered.v1", Arc::new(NoopHandler));
        registry.register("user.registered.v1", Arc::new(NoopHandler));
        assert_eq!(registry.handlers_for("user.registered.v1").len(), 2);
    }

    #[rstest]
    fn it_should_resolve_no_handlers_for_an_unregistered_type() {
        let registry = HandlerRegistry::new();
        assert!(registry.handlers_for("stock.level_changed.v1").is_empty());
    }
}
