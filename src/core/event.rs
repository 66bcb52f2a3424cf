// Root event enumeration and the envelope carried through dispatch and the outbox.
//
// Purpose
// - Provide a single closed type to pattern match in the serializer and dispatcher.
//
// Versioning and evolution
// - Prefer additive changes. If a breaking change is needed, add a new version and a new variant.
// - Do not change the meaning of historical events.
//
// Structure
// - This file defines the root payload enumeration and the envelope.
// - The sibling folder 'event/' contains versioned payload modules (for example: v1/).

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod v1 {
    pub mod role_assigned;
    pub mod role_permissions_elevated;
    pub mod stock_level_changed;
    pub mod user_registered;
}

use v1::role_assigned::RoleAssignedV1;
use v1::role_permissions_elevated::RolePermissionsElevatedV1;
use v1::stock_level_changed::StockLevelChangedV1;
use v1::user_registered::UserRegisteredV1;

/// How an event must be observed relative to the operation that raised it.
///
/// Critical events run their in-process handlers before dispatch returns.
/// Deferred events only ever travel through the outbox. Regular events are
/// the default and are treated as deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Critical,
    Deferred,
    Regular,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EventPayload {
    UserRegistered(UserRegisteredV1),
    RolePermissionsElevated(RolePermissionsElevatedV1),
    RoleAssigned(RoleAssignedV1),
    StockLevelChanged(StockLevelChangedV1),
}

impl EventPayload {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::UserRegistered(_) => UserRegisteredV1::EVENT_TYPE,
            EventPayload::RolePermissionsElevated(_) => RolePermissionsElevatedV1::EVENT_TYPE,
            EventPayload::RoleAssigned(_) => RoleAssignedV1::EVENT_TYPE,
            EventPayload::StockLevelChanged(_) => StockLevelChangedV1::EVENT_TYPE,
        }
    }

    pub fn classification(&self) -> EventClass {
        match self {
            EventPayload::UserRegistered(_) => EventClass::Critical,
            EventPayload::RolePermissionsElevated(_) => EventClass::Critical,
            EventPayload::RoleAssigned(_) => EventClass::Regular,
            EventPayload::StockLevelChanged(_) => EventClass::Deferred,
        }
    }

    /// Ordering key for the synchronous critical pass. Lower runs first.
    pub fn priority(&self) -> u8 {
        match self {
            EventPayload::UserRegistered(_) => 10,
            EventPayload::RolePermissionsElevated(_) => 20,
            _ => 50,
        }
    }
}

/// An immutable fact raised by an aggregate, ready for dispatch.
///
/// The envelope owns identity and time; the payload owns the business fields.
/// Aggregates buffer envelopes until their unit of work commits.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub payload: EventPayload,
}

impl EventEnvelope {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Envelope with an explicit occurrence time, for replay and tests.
    pub fn at(payload: EventPayload, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at,
            payload,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    pub fn classification(&self) -> EventClass {
        self.payload.classification()
    }

    pub fn priority(&self) -> u8 {
        self.payload.priority()
    }
}

#[cfg(test)]
mod event_envelope_tests {
    use super::*;
    use rstest::rstest;

    fn user_registered() -> EventPayload {
        EventPayload::UserRegistered(UserRegisteredV1 {
            user_id: "user-fixed-0001".to_string(),
            email: "teddy@example.test".to_string(),
            display_name: "Teddy Test".to_string(),
            registered_at: 1_700_000_000_000,
            locale: None,
        })
    }

    #[rstest]
    fn it_should_derive_type_and_class_from_the_payload() {
        let envelope = EventEnvelope::new(user_registered());
        assert_eq!(envelope.event_type(), "user.registered.v1");
        assert_eq!(envelope.classification(), EventClass::Critical);
        assert_eq!(envelope.priority(), 10);
    }

    #[rstest]
    fn it_should_treat_stock_changes_as_deferred() {
        let payload = EventPayload::StockLevelChanged(StockLevelChangedV1 {
            sku: "SKU-0001".to_string(),
            warehouse_id: "wh-01".to_string(),
            previous_quantity: 10,
            new_quantity: 7,
            changed_at: 1_700_000_000_000,
        });
        assert_eq!(payload.classification(), EventClass::Deferred);
        assert_eq!(payload.priority(), 50);
    }

    #[rstest]
    fn it_should_assign_fresh_identifiers_per_envelope() {
        let a = EventEnvelope::new(user_registered());
        let b = EventEnvelope::new(user_registered());
        assert_ne!(a.event_id, b.event_id);
    }
}
