use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for an event, carrying the identity of the record it is about.
///
/// Notes:
/// - `entity_type` is a stable name such as `"sales.order_item"`.
/// - `payload` is the typed event itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    entity_id: Uuid,
    entity_type: String,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        entity_id: Uuid,
        entity_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            entity_id,
            entity_type: entity_type.into(),
            payload,
        }
    }

    /// Wrap `payload` with a freshly generated (UUIDv7) event id.
    pub fn wrap(entity_id: Uuid, entity_type: impl Into<String>, payload: E) -> Self {
        Self::new(Uuid::now_v7(), entity_id, entity_type, payload)
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn entity_id(&self) -> Uuid {
        self.entity_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
