// Relay process entry point: wiring and lifecycle only, no business logic.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use event_relay::adapters::in_memory::in_memory_outbox_store::InMemoryOutboxStore;
use event_relay::adapters::pulsar::pulsar_broker_publisher::PulsarBrokerPublisher;
use event_relay::application::publisher::{OutboxPublisher, PublisherDeps};
use event_relay::application::serializer::EventSerializer;
use event_relay::core::ports::BrokerPublisher;
use event_relay::shell::config::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = RelayConfig::from_env();

    // TODO: swap InMemoryOutboxStore for the relational adapter once the
    // outbox schema module lands.
    let store = Arc::new(InMemoryOutboxStore::new());
    let serializer = Arc::new(EventSerializer::with_known_events());

    let deps = config.broker.as_ref().map(|broker| {
        let publisher: Arc<dyn BrokerPublisher> = Arc::new(PulsarBrokerPublisher::new(
            broker.url.clone(),
            broker.tenant.clone(),
            broker.namespace.clone(),
            broker.producer_name.clone(),
            config.producer_settings(),
        ));
        PublisherDeps {
            store: store.clone(),
            dead_letters: store.clone(),
            broker: publisher,
            serializer: serializer.clone(),
        }
    });

    let publisher = OutboxPublisher::new(deps, config.publisher_config());
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let worker = tokio::spawn(async move { publisher.run(worker_cancel).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    cancel.cancel();
    worker.await?;
    Ok(())
}
