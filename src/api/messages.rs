//! Control Messages
//!
//! The popup and the blocked-page UI talk to the engine with small tagged
//! JSON messages. Unknown message types fail deserialization at the host
//! boundary and never reach the engine.

use serde::{Deserialize, Serialize};

use crate::logic::engine::Engine;

/// Messages consumed by the background engine from the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// Surface the alerts view (popup dashboard).
    OpenAlerts,
    /// Add a domain to the persisted blocked set (deduplicated).
    BlockDomain { domain: String },
    /// Remove a domain from the blocked set (sent by the blocked page).
    UnblockDomain { domain: String },
}

impl Engine {
    /// Dispatch one control message.
    pub fn on_message(&self, message: ControlMessage) {
        match message {
            ControlMessage::OpenAlerts => {
                if let Err(e) = self.host.open_alerts_view() {
                    log::debug!("Alerts view not opened: {}", e);
                }
            }
            ControlMessage::BlockDomain { domain } => self.block_domain(&domain),
            ControlMessage::UnblockDomain { domain } => self.unblock_domain(&domain),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
