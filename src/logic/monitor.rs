//! Monitoring Toggle
//!
//! Process-wide enable/disable flag. The persisted `monitorEnabled` key is
//! the source of truth: the flag is read once at startup (default enabled
//! when unset) and then follows storage writes through the store's push
//! notifications - no polling anywhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::constants::keys;
use crate::logic::storage::Storage;

/// Shared monitoring flag.
#[derive(Clone)]
pub struct MonitorFlag {
    enabled: Arc<AtomicBool>,
}

impl MonitorFlag {
    /// Initialize from storage and subscribe to external changes.
    pub fn init(storage: &Storage) -> Self {
        let initial = storage.get::<bool>(keys::MONITOR_ENABLED).unwrap_or(true);
        log::info!(
            "Monitoring initialized: {}",
            if initial { "ENABLED" } else { "DISABLED" }
        );

        let enabled = Arc::new(AtomicBool::new(initial));

        let flag = enabled.clone();
        storage.on_change(keys::MONITOR_ENABLED, move |value| {
            let new_value = value.as_bool().unwrap_or(true);
            flag.store(new_value, Ordering::SeqCst);
            log::info!(
                "Monitoring state changed to: {}",
                if new_value { "ENABLED" } else { "DISABLED" }
            );
        });

        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Write through to storage; the change notification updates the flag.
    pub fn set(&self, storage: &Storage, value: bool) {
        if let Err(e) = storage.set(keys::MONITOR_ENABLED, &value) {
            log::error!("Failed to persist monitoring flag: {}", e);
            // Keep the in-memory flag coherent even if the write failed.
            self.enabled.store(value, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
