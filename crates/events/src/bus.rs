//! Event bus abstraction for decoupled event emission.
//!
//! The engine publishes prompt, toast and flow events through this trait,
//! so it can be driven by any host (or by tests) without a UI toolkit.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::OutboundEvent;

/// Trait for emitting events to the host.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name/topic (e.g., "prompt:select_shown")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize a typed event and emit it under its topic.
pub fn publish<E: OutboundEvent>(bus: &dyn EventBus, event: &E) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(E::TOPIC, payload),
        Err(e) => tracing::warn!(topic = E::TOPIC, "failed to serialize event: {}", e),
    }
}

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every captured event of type `E`, oldest first.
    pub fn decoded<E: OutboundEvent + DeserializeOwned>(&self) -> Vec<E> {
        self.events_for(E::TOPIC)
            .into_iter()
            .filter_map(|e| serde_json::from_value(e.payload).ok())
            .collect()
    }

    /// Most recent event of type `E`, if any.
    pub fn last<E: OutboundEvent + DeserializeOwned>(&self) -> Option<E> {
        self.decoded::<E>().pop()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.events.lock().unwrap().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_names, Toast, ToastLevel};

    #[test]
    fn test_publish_uses_event_topic() {
        let bus = InMemoryEventBus::new();

        publish(&bus, &Toast::info("Username available for 45 seconds"));
        publish(&bus, &Toast::error("Error from crypto service: bad key"));

        assert_eq!(bus.len(), 2);
        assert_eq!(bus.events_for(event_names::TOAST).len(), 2);

        let last: Toast = bus.last().unwrap();
        assert_eq!(last.level, ToastLevel::Error);
        assert_eq!(bus.decoded::<Toast>()[0].level, ToastLevel::Info);
    }

    #[test]
    fn test_in_memory_event_bus_clear() {
        let bus = InMemoryEventBus::new();

        bus.emit("test:event", serde_json::json!({}));
        assert!(!bus.is_empty());

        bus.clear();
        assert!(bus.is_empty());
        assert!(bus.last::<Toast>().is_none());
    }

    #[test]
    fn test_null_event_bus() {
        publish(&NullEventBus, &Toast::info("ignored"));
    }
}
