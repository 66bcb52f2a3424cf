// Environment-driven configuration for the relay process.

use std::time::Duration;

use crate::adapters::pulsar::pulsar_broker_publisher::ProducerSettings;
use crate::application::publisher::PublisherConfig;

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub url: String,
    pub tenant: String,
    pub namespace: String,
    pub producer_name: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub poll_interval: Duration,
    pub batch_size: usize,
    pub max_retries: i32,
    pub source_tag: String,
    /// Absent means the process runs in degrade mode: no background delivery.
    pub broker: Option<BrokerConfig>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let defaults = PublisherConfig::default();
        let poll_interval = var("RELAY_POLL_INTERVAL_SECS")
            .and_then(|value| value.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);
        let batch_size = var("RELAY_BATCH_SIZE")
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.batch_size);
        let max_retries = var("RELAY_MAX_RETRIES")
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.max_retries);
        let source_tag = var("RELAY_SOURCE_TAG").unwrap_or(defaults.source_tag);

        let broker = var("PULSAR_BROKER_URL").map(|url| BrokerConfig {
            url,
            tenant: var("PULSAR_TENANT").unwrap_or_else(|| "public".to_string()),
            namespace: var("PULSAR_NAMESPACE").unwrap_or_else(|| "default".to_string()),
            producer_name: var("PULSAR_PRODUCER_NAME")
                .unwrap_or_else(|| "event_relay_producer".to_string()),
        });

        Self {
            poll_interval,
            batch_size,
            max_retries,
            source_tag,
            broker,
        }
    }

    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            poll_interval: self.poll_interval,
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            source_tag: self.source_tag.clone(),
        }
    }

    pub fn producer_settings(&self) -> ProducerSettings {
        ProducerSettings::default()
    }
}
