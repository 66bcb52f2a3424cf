// Wire serialization and the event type registry.
//
// Purpose
// - Convert payloads to and from the durable string kept in event_data.
// - Keep a static name -> decoder table, assembled once at startup with every
//   known event. No runtime reflection: the event set is a closed enum and
//   registration is explicit.
//
// Failure semantics
// - An unregistered type name fails loudly. This is distinct from the unknown
//   topic fallback in core::topics, which only picks a publish target.
// - Forward compatible: new optional payload fields carry #[serde(default)]
//   so older persisted rows keep deserializing.

use std::collections::HashMap;

use thiserror::Error;

use crate::core::event::v1::role_assigned::RoleAssignedV1;
use crate::core::event::v1::role_permissions_elevated::RolePermissionsElevatedV1;
use crate::core::event::v1::stock_level_changed::StockLevelChangedV1;
use crate::core::event::v1::user_registered::UserRegisteredV1;
use crate::core::event::EventPayload;

#[derive(Debug, Error)]
pub enum SerializerError {
    #[error("no deserializer registered for event type '{0}'")]
    UnknownEventType(String),

    #[error("malformed payload for event type '{event_type}': {reason}")]
    Malformed { event_type: String, reason: String },

    #[error("failed to serialize event type '{event_type}': {reason}")]
    Encode { event_type: String, reason: String },
}

type DecodeFn = fn(&str) -> Result<EventPayload, serde_json::Error>;

pub struct EventSerializer {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl EventSerializer {
    /// Registry covering every event the system knows how to raise.
    pub fn with_known_events() -> Self {
        let mut serializer = Self {
            decoders: HashMap::new(),
        };
        serializer.register(UserRegisteredV1::EVENT_TYPE, |data| {
            Ok(EventPayload::UserRegistered(serde_json::from_str(data)?))
        });
        serializer.register(RolePermissionsElevatedV1::EVENT_TYPE, |data| {
            Ok(EventPayload::RolePermissionsElevated(serde_json::from_str(
                data,
            )?))
        });
        serializer.register(RoleAssignedV1::EVENT_TYPE, |data| {
            Ok(EventPayload::RoleAssigned(serde_json::from_str(data)?))
        });
        serializer.register(StockLevelChangedV1::EVENT_TYPE, |data| {
            Ok(EventPayload::StockLevelChanged(serde_json::from_str(data)?))
        });
        serializer
    }

    fn register(&mut self, event_type: &'static str, decode: DecodeFn) {
        self.decoders.insert(event_type, decode);
    }

    pub fn serialize(&self, payload: &EventPayload) -> Result<String, SerializerError> {
        let encoded = match payload {
            EventPayload::UserRegistered(p) => serde_json::to_string(p),
            EventPayload::RolePermissionsElevated(p) => serde_json::to_string(p),
            EventPayload::RoleAssigned(p) => serde_json::to_string(p),
            EventPayload::StockLevelChanged(p) => serde_json::to_string(p),
        };
        encoded.map_err(|err| SerializerError::Encode {
            event_type: payload.event_type().to_string(),
            reason: err.to_string(),
        })
    }

    pub fn deserialize(
        &self,
        event_type: &str,
        data: &str,
    ) -> Result<EventPayload, SerializerError> {
        let decode = self
            .decoders
            .get(event_type)
            .ok_or_else(|| SerializerError::UnknownEventType(event_type.to_string()))?;
        decode(data).map_err(|err| SerializerError::Malformed {
            event_type: event_type.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod event_serializer_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn serializer() -> EventSerializer {
        EventSerializer::with_known_events()
    }

    #[fixture]
    fn registered_payload() -> EventPayload {
        EventPayload::UserRegistered(UserRegisteredV1 {
            user_id: "user-fixed-0001".to_string(),
            email: "teddy@example.test".to_string(),
            display_name: "Teddy Test".to_string(),
            registered_at: 1_700_000_000_000,
            locale: None,
        })
    }

    #[rstest]
    fn it_should_round_trip_a_known_payload(
        serializer: EventSerializer,
        registered_payload: EventPayload,
    ) {
        let data = serializer.serialize(&registered_payload).unwrap();
        let decoded = serializer
            .deserialize(UserRegisteredV1::EVENT_TYPE, &data)
            .unwrap();
        assert_eq!(decoded, registered_payload);
    }

    #[rstest]
    fn it_should_fail_loudly_for_an_unregistered_event_type(serializer: EventSerializer) {
        let result = serializer.deserialize("billing.invoice_issued.v1", "{}");
        assert!(matches!(
            result,
            Err(SerializerError::UnknownEventType(name)) if name == "billing.invoice_issued.v1"
        ));
    }

    #[rstest]
    fn it_should_fail_with_malformed_for_a_broken_payload(serializer: EventSerializer) {
        let result = serializer.deserialize(UserRegisteredV1::EVENT_TYPE, "{\"user_id\":42}");
        assert!(matches!(result, Err(SerializerError::Malformed { .. })));
    }

    #[rstest]
    fn it_should_decode_rows_written_before_an_additive_field(serializer: EventSerializer) {
        let old_row = r#"{
            "user_id": "user-fixed-0001",
            "email": "teddy@example.test",
            "display_name": "Teddy Test",
            "registered_at": 1700000000000
        }"#;
        let decoded = serializer
            .deserialize(UserRegisteredV1::EVENT_TYPE, old_row)
            .unwrap();
        match decoded {
            EventPayload::UserRegistered(p) => assert_eq!(p.locale, None),
            other => panic!("expected UserRegistered, got {other:?}"),
        }
    }
}
