//! Host Boundary
//!
//! The browser host implements this side of the contract: injecting warning
//! banners into tabs and surfacing the alerts view. Every call is
//! fire-and-forget from the engine's point of view - a tab that is already
//! gone is a debug line, not a failure.

// ============================================================================
// TYPES
// ============================================================================

/// Browser tab identifier. Negative ids mark non-tab-scoped requests.
pub type TabId = i64;

/// Which warning banner to inject into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningBanner {
    /// Malicious or suspicious request observed from this page
    MaliciousTraffic,
    /// Page loaded over plain HTTP
    InsecureHttp,
    /// Phishing verdict for this page
    Phishing,
}

impl WarningBanner {
    /// Content script the host injects for this banner.
    pub fn script_name(&self) -> &'static str {
        match self {
            WarningBanner::MaliciousTraffic => "trafficNotification",
            WarningBanner::InsecureHttp => "httpNotification",
            WarningBanner::Phishing => "phishingNotification",
        }
    }
}

/// Host-side failures. The engine swallows these.
#[derive(Debug, Clone)]
pub enum HostError {
    TabGone(TabId),
    Host(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TabGone(tab_id) => write!(f, "Tab {} no longer exists", tab_id),
            Self::Host(e) => write!(f, "Host error: {}", e),
        }
    }
}

impl std::error::Error for HostError {}

// ============================================================================
// BRIDGE
// ============================================================================

/// Outward side effects, implemented by the embedding host.
pub trait HostBridge: Send + Sync {
    /// Inject a warning banner into a tab.
    fn inject_warning(&self, tab_id: TabId, banner: WarningBanner) -> Result<(), HostError>;

    /// Bring up the alerts view (popup dashboard).
    fn open_alerts_view(&self) -> Result<(), HostError>;
}

/// No-op host for tests and headless runs; logs instead of injecting.
pub struct NullHost;

impl HostBridge for NullHost {
    fn inject_warning(&self, tab_id: TabId, banner: WarningBanner) -> Result<(), HostError> {
        log::debug!("inject {} into tab {}", banner.script_name(), tab_id);
        Ok(())
    }

    fn open_alerts_view(&self) -> Result<(), HostError> {
        log::debug!("open alerts view");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
