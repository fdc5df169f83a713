//! Navigation Lifecycle Handlers
//!
//! Separate from request interception: redirect hops feed the per-tab
//! counter, and navigation completion consumes it into the URL feature
//! record. Plain-HTTP pages get the insecure-connection banner here,
//! independent of the classification pipeline and of the monitoring flag.

use crate::logic::engine::Engine;
use crate::logic::events::UiEvent;
use crate::logic::features::extract_url_features;
use crate::logic::host::{TabId, WarningBanner};

impl Engine {
    /// One intermediate redirect hop observed for a tab.
    pub fn on_redirect(&self, tab_id: TabId) {
        self.redirects.lock().on_redirect(tab_id);
    }

    /// Top-level navigation finished loading in a tab.
    pub async fn on_navigation_completed(&self, tab_id: TabId, url: &str) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return;
        }

        let n_redirection = self.redirects.lock().consume_and_clear(tab_id);
        let features = extract_url_features(url, n_redirection);
        log::debug!(
            "URL features extracted for {} ({} redirect hops)",
            url,
            n_redirection
        );
        self.events.emit(UiEvent::PageFeatures {
            url: url.to_string(),
            features,
        });

        if url.starts_with("http://") && tab_id > 0 {
            self.notify_inject(tab_id, WarningBanner::InsecureHttp);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
