// Pulsar REST implementation of the BrokerPublisher port.
//
// Delivery semantics
// - Producer settings request all-replica acknowledgment, broker-side
//   deduplication keyed on the stable producer name (idempotent producer),
//   and payload compression.
// - Transient transport failures are retried here with bounded exponential
//   backoff; whatever survives the retry budget surfaces as BrokerError to
//   the caller, which owns the outbox bookkeeping.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::ports::{BrokerError, BrokerMessage, BrokerPublisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Lz4,
    Zstd,
}

impl Compression {
    fn as_str(self) -> &'static str {
        match self {
            Compression::None => "NONE",
            Compression::Lz4 => "LZ4",
            Compression::Zstd => "ZSTD",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub ack_all_replicas: bool,
    pub deduplication_enabled: bool,
    pub compression: Compression,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            ack_all_replicas: true,
            deduplication_enabled: true,
            compression: Compression::Lz4,
            max_attempts: 4,
            base_backoff: Duration::from_millis(250),
        }
    }
}

pub struct PulsarBrokerPublisher {
    client: reqwest::Client,
    broker_url: String,
    tenant: String,
    namespace: String,
    producer_name: String,
    settings: ProducerSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PulsarMessageProperties {
    event_type: String,
    published_at: i64,
    source: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PulsarMessage {
    payload: String,
    key: Option<String>,
    properties: PulsarMessageProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PulsarProducerBody {
    producer_name: String,
    sync_replication: bool,
    deduplication_enabled: bool,
    compression: &'static str,
    messages: Vec<PulsarMessage>,
}

impl PulsarBrokerPublisher {
    pub fn new(
        broker_url: impl Into<String>,
        tenant: impl Into<String>,
        namespace: impl Into<String>,
        producer_name: impl Into<String>,
        settings: ProducerSettings,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            broker_url: broker_url.into(),
            tenant: tenant.into(),
            namespace: namespace.into(),
            producer_name: producer_name.into(),
            settings,
        }
    }

    fn endpoint(&self, topic: &str) -> String {
        format!(
            "{}/topics/persistent/{}/{}/{}",
            self.broker_url, self.tenant, self.namespace, topic
        )
    }

    async fn send_once(&self, topic: &str, body: &PulsarProducerBody) -> Result<(), BrokerError> {
        let response = self
            .client
            .post(self.endpoint(topic))
            .json(body)
            .send()
            .await
            .map_err(|err| BrokerError::Transient(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.is_client_error() {
            return Err(BrokerError::Rejected(format!(
                "broker returned {status} for topic {topic}"
            )));
        }
        Err(BrokerError::Transient(format!(
            "broker returned {status} for topic {topic}"
        )))
    }
}

#[async_trait]
impl BrokerPublisher for PulsarBrokerPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        message: BrokerMessage,
    ) -> Result<(), BrokerError> {
        let body = PulsarProducerBody {
            producer_name: self.producer_name.clone(),
            sync_replication: self.settings.ack_all_replicas,
            deduplication_enabled: self.settings.deduplication_enabled,
            compression: self.settings.compression.as_str(),
            messages: vec![PulsarMessage {
                payload: message.payload,
                key: Some(key.to_string()),
                properties: PulsarMessageProperties {
                    event_type: message.headers.event_type,
                    published_at: message.headers.published_at.timestamp_millis(),
                    source: message.headers.source,
                },
            }],
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(topic, &body).await {
                Ok(()) => return Ok(()),
                Err(err @ BrokerError::Rejected(_)) => return Err(err),
                Err(err) => {
                    if attempt >= self.settings.max_attempts {
                        return Err(err);
                    }
                    let backoff = self.settings.base_backoff * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        topic,
                        attempt,
                        error = %err,
                        "transient broker failure, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
