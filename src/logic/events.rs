//! UI Event Broadcast
//!
//! Fan-out channel for the popup/dashboard. Delivery is best-effort by
//! design: a closed popup means no receivers, and a send with no receivers
//! is not an error.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::logic::features::UrlFeatures;
use crate::logic::store::Snapshot;

/// Events delivered to any live UI listener.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    /// Full snapshot after each processed request.
    StatsUpdate(Snapshot),
    /// URL features extracted on navigation completion.
    PageFeatures { url: String, features: UrlFeatures },
}

/// Broadcast handle owned by the engine.
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a new UI listener.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit to all listeners; absent listeners are swallowed.
    pub fn emit(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            log::trace!("No UI listeners, event dropped");
        }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
