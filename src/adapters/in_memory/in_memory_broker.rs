// In memory implementation of the BrokerPublisher port.
//
// Purpose
// - Support publisher tests: record what was published, or fail every publish
//   with a configured reason to exercise the retry path.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::ports::{BrokerError, BrokerMessage, BrokerPublisher};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub message: BrokerMessage,
}

#[derive(Default)]
pub struct InMemoryBroker {
    published: Mutex<Vec<PublishedMessage>>,
    fail_with: Option<String>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broker that rejects every publish with a transient failure.
    pub fn failing(reason: &str) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().await.clone()
    }

    pub async fn publish_count(&self) -> usize {
        self.published.lock().await.len()
    }
}

#[async_trait]
impl BrokerPublisher for InMemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        message: BrokerMessage,
    ) -> Result<(), BrokerError> {
        if let Some(reason) = &self.fail_with {
            return Err(BrokerError::Transient(reason.clone()));
        }
        self.published.lock().await.push(PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            message,
        });
        Ok(())
    }
}

#[cfg(test)]
mod in_memory_broker_tests {
    use super::*;
    use crate::core::ports::MessageHeaders;
    use chrono::Utc;
    use rstest::rstest;

    fn message() -> BrokerMessage {
        BrokerMessage {
            payload: "{}".to_string(),
            headers: MessageHeaders {
                event_type: "role.assigned.v1".to_string(),
                published_at: Utc::now(),
                source: "event-relay".to_string(),
            },
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_record_published_messages() {
        let broker = InMemoryBroker::new();
        broker
            .publish("role-events", "key-1", message())
            .await
            .unwrap();
        let published = broker.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "role-events");
        assert_eq!(published[0].key, "key-1");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_every_publish_when_configured_to() {
        let broker = InMemoryBroker::failing("connection refused");
        let result = broker.publish("role-events", "key-1", message()).await;
        assert!(matches!(result, Err(BrokerError::Transient(reason)) if reason == "connection refused"));
        assert_eq!(broker.publish_count().await, 0);
    }
}
