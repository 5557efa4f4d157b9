//! Observer System - things that react to monitor events
//!
//! Philosophy:
//! - Composition > Inheritance
//! - Every observer sees every event and picks what it cares about

use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;

use crate::events::MonitorEvent;

/// Reacts to events from a [`crate::DocumentMonitor`]
#[async_trait]
pub trait MonitorObserver: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Called for EVERY event, in publication order
    async fn on_event(&self, event: &MonitorEvent);

    /// Optional: called when the monitor starts
    async fn on_start(&self) {}

    /// Optional: called when the monitor stops
    async fn on_stop(&self) {}
}

/// Observer set - dispatches events to all observers
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn MonitorObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer
    pub fn register(&mut self, observer: Arc<dyn MonitorObserver>) {
        tracing::debug!("Registered observer: {}", observer.name());
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub async fn start_all(&self) {
        join_all(self.observers.iter().map(|o| o.on_start())).await;
    }

    pub async fn stop_all(&self) {
        join_all(self.observers.iter().map(|o| o.on_stop())).await;
    }

    /// Dispatch one event to all observers concurrently
    pub async fn dispatch(&self, event: Arc<MonitorEvent>) {
        let tasks: Vec<_> = self
            .observers
            .iter()
            .map(|o| {
                let event = event.clone();
                async move {
                    o.on_event(&event).await;
                }
            })
            .collect();

        join_all(tasks).await;
    }
}
