//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default classifier endpoint, only edit this file.

/// Default classifier endpoint
///
/// This is the fallback URL when no environment variable is set.
/// The local model server exposes a single POST /predict route.
pub const DEFAULT_CLASSIFIER_URL: &str = "http://127.0.0.1:8000/predict";

/// Default classification timeout (seconds)
///
/// A hung backend must not accumulate unbounded pending tasks.
pub const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 5;

/// Traffic log capacity (FIFO eviction past this)
pub const MAX_TRAFFIC_ENTRIES: usize = 50;

/// Alerts log capacity
pub const MAX_ALERT_ENTRIES: usize = 20;

/// Recent-alerts summary capacity
pub const MAX_RECENT_ALERTS: usize = 20;

/// Broadcast channel capacity for UI listeners
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The extension's own internal scheme - never intercepted
pub const INTERNAL_SCHEME: &str = "chrome-extension://";

/// URL fragments that mark telemetry/analytics noise - never intercepted
pub const EXCLUDED_PATH_MARKERS: [&str; 3] = ["/v1/traces", "/analytics", "/telemetry"];

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Web-Shield";

/// Persisted state keys (shared with the popup UI)
pub mod keys {
    pub const MONITOR_ENABLED: &str = "monitorEnabled";
    pub const STATS: &str = "stats";
    pub const TRAFFIC_LOG: &str = "trafficLog";
    pub const ALERTS_LOG: &str = "alertsLog";
    pub const RECENT_ALERTS: &str = "recentAlerts";
    pub const BLOCKED: &str = "blocked";
}

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get classifier endpoint from environment or use default
pub fn get_classifier_url() -> String {
    std::env::var("CLASSIFIER_URL").unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.to_string())
}

/// Get classification timeout from environment or use default
pub fn get_classify_timeout_secs() -> u64 {
    std::env::var("CLASSIFY_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CLASSIFY_TIMEOUT_SECS)
}
