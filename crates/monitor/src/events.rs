//! Event Bus - what a monitored document reports to the outside
//!
//! Design: one enum for every event, cloned to each subscriber through a
//! tokio broadcast channel. Nobody subscribing is not an error.

use landmarks::LandmarkInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a scan ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanTrigger {
    /// A mutation batch passed the scheduler and the relevance check
    Mutation,
    /// Explicit request, visibility resume, or stale results
    Request,
}

/// Document monitor events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MonitorEvent {
    /// The landmark list was replaced
    LandmarksUpdated { landmarks: Vec<LandmarkInfo> },
    ScanCompleted {
        trigger: ScanTrigger,
        duration_ms: u64,
        count: usize,
    },
    PauseChanged { pause_ms: u64 },
    /// A mutation batch arrived
    MutationObserved,
    /// A mutation batch got past the scheduler and was inspected
    MutationChecked,
    /// Single-page navigation: treat as a new page
    PageReset,
}

/// Simple event bus using tokio broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: MonitorEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.clone().publish(MonitorEvent::PauseChanged { pause_ms: 750 });

        match rx.recv().await {
            Ok(MonitorEvent::PauseChanged { pause_ms: 750 }) => {}
            other => panic!("Expected PauseChanged event, got {:?}", other),
        }
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(MonitorEvent::ScanCompleted {
            trigger: ScanTrigger::Mutation,
            duration_ms: 3,
            count: 7,
        })
        .unwrap();
        assert_eq!(json["type"], "scan-completed");
        assert_eq!(json["trigger"], "mutation");
    }
}
