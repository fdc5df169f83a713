//! Request Interception Pipeline
//!
//! One async task per intercepted request: gate, count, extract, classify,
//! record, persist, broadcast, and - for alert-tier verdicts - inject a
//! warning banner into the originating tab.
//!
//! Feature extraction and log mutation are synchronous; the classification
//! call is the only suspension point, so insertions into each log land in
//! verdict-arrival order even when calls complete out of submission order.

use chrono::{DateTime, Utc};

use crate::constants;
use crate::logic::classify::Verdict;
use crate::logic::engine::Engine;
use crate::logic::features;
use crate::logic::host::{TabId, WarningBanner};
use crate::logic::store::{entry_time, AlertEntry, RecentAlert, TrafficEntry};

// ============================================================================
// EVENT TYPE
// ============================================================================

/// One outgoing request as reported by the browser. Ephemeral: nothing here
/// is retained beyond feature extraction.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub url: String,
    pub method: String,
    /// Raw request body bytes, when the browser captured any.
    pub body: Option<Vec<u8>>,
    pub tab_id: TabId,
    pub timestamp: DateTime<Utc>,
}

impl RequestEvent {
    pub fn new(url: &str, method: &str, body: Option<Vec<u8>>, tab_id: TabId) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            body,
            tab_id,
            timestamp: Utc::now(),
        }
    }
}

/// Host part of a URL, if it parses.
pub(crate) fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

// ============================================================================
// PIPELINE
// ============================================================================

impl Engine {
    /// Handle one intercepted request event.
    ///
    /// Stages run strictly in order for this event; an unavailable backend
    /// drops the event with no log mutation (the request counter was already
    /// bumped, so the attempt still shows in stats).
    pub async fn on_request(&self, event: RequestEvent) {
        if !self.monitor.is_enabled() {
            return;
        }
        if self.is_excluded(&event.url) {
            return;
        }

        let domain = host_of(&event.url);
        if let Some(domain) = domain.as_deref() {
            if self.blocklist.lock().contains(domain) {
                log::info!("Request to blocked domain dropped: {}", domain);
                self.store.lock().increment_blocked_count();
                self.publish();
                return;
            }
        }

        // Counted before extraction: a crash mid-pipeline still reflects an
        // attempted request.
        self.store.lock().increment_request_count();

        let features = features::extract_request_features(&event);

        let classification = match self.classifier.classify(&features).await {
            Ok(classification) => classification,
            Err(e) => {
                log::warn!("Classifier unavailable, request dropped: {}", e);
                return;
            }
        };

        let verdict = classification.verdict;
        let raises_alert = self.policy.should_alert(verdict);
        log::debug!("{} {} -> {}", event.method, event.url, verdict);

        {
            let mut store = self.store.lock();
            store.update_avg_time(classification.elapsed_ms);

            store.record_traffic(TrafficEntry {
                time: entry_time(),
                url: event.url.clone(),
                method: event.method.clone(),
                classification: verdict,
            });

            if raises_alert {
                let entry = AlertEntry {
                    id: 0, // assigned by the store
                    domain: domain.unwrap_or_default(),
                    classification: verdict,
                    method: event.method.clone(),
                    path: features.path.clone(),
                    features,
                };
                let summary = RecentAlert {
                    time: entry_time(),
                    url: event.url.clone(),
                    method: event.method.clone(),
                    classification: verdict,
                };
                store.record_alert(entry, summary);
            }
        }

        self.publish();

        if raises_alert && event.tab_id > 0 {
            let banner = match verdict {
                Verdict::Phishing => WarningBanner::Phishing,
                _ => WarningBanner::MaliciousTraffic,
            };
            self.notify_inject(event.tab_id, banner);
        }
    }

    /// Self-traffic and telemetry noise suppression.
    fn is_excluded(&self, url: &str) -> bool {
        url.starts_with(self.classifier.endpoint())
            || url.starts_with(constants::INTERNAL_SCHEME)
            || constants::EXCLUDED_PATH_MARKERS
                .iter()
                .any(|marker| url.contains(marker))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::logic::classify::{AlertPolicy, ClassifierConfig};
    use crate::logic::engine::{Engine, EngineConfig};
    use crate::logic::host::{HostBridge, HostError, NullHost};
    use crate::logic::storage::Storage;

    /// Minimal classifier stub: answers every connection with a canned JSON
    /// body over HTTP/1.1, then closes.
    async fn spawn_stub(body: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 8192];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/predict", addr)
    }

    struct RecordingHost {
        injections: Mutex<Vec<(TabId, WarningBanner)>>,
    }

    impl RecordingHost {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                injections: Mutex::new(Vec::new()),
            })
        }
    }

    impl HostBridge for RecordingHost {
        fn inject_warning(&self, tab_id: TabId, banner: WarningBanner) -> Result<(), HostError> {
            self.injections.lock().push((tab_id, banner));
            Ok(())
        }

        fn open_alerts_view(&self) -> Result<(), HostError> {
            Ok(())
        }
    }

    fn engine_with(endpoint: &str, host: Arc<dyn HostBridge>) -> Engine {
        let config = EngineConfig {
            classifier: ClassifierConfig {
                endpoint: endpoint.to_string(),
                timeout_seconds: 2,
            },
            policy: AlertPolicy::default(),
            event_capacity: 8,
        };
        Engine::new(Arc::new(Storage::open_in_memory().unwrap()), host, config)
    }

    fn post_event(url: &str, body: &[u8]) -> RequestEvent {
        RequestEvent::new(url, "POST", Some(body.to_vec()), 7)
    }

    #[tokio::test]
    async fn test_malicious_verdict_records_everything() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"bad"}}}"#).await;
        let host = RecordingHost::new();
        let engine = engine_with(&endpoint, host.clone());

        engine
            .on_request(post_event("https://evil.example/login", b"name=admin' OR 1=1 --"))
            .await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.stats.requests, 1);
        assert_eq!(snapshot.stats.alerts, 1);
        assert_eq!(snapshot.traffic_log.len(), 1);
        assert_eq!(snapshot.traffic_log[0].classification, Verdict::Malicious);
        assert_eq!(snapshot.alerts_log.len(), 1);
        assert_eq!(snapshot.alerts_log[0].domain, "evil.example");
        assert_eq!(snapshot.alerts_log[0].path, "/login");
        assert!(snapshot.alerts_log[0].features.badwords_count >= 1);
        assert_eq!(snapshot.recent_alerts.len(), 1);

        let injections = host.injections.lock();
        assert_eq!(injections.as_slice(), &[(7, WarningBanner::MaliciousTraffic)]);
    }

    #[tokio::test]
    async fn test_safe_verdict_records_traffic_only() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"good"}}}"#).await;
        let host = RecordingHost::new();
        let engine = engine_with(&endpoint, host.clone());

        engine
            .on_request(post_event("https://fine.example/search", b"q=weather"))
            .await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.stats.requests, 1);
        assert_eq!(snapshot.stats.alerts, 0);
        assert_eq!(snapshot.traffic_log.len(), 1);
        assert_eq!(snapshot.traffic_log[0].classification, Verdict::Safe);
        assert!(snapshot.alerts_log.is_empty());
        assert!(host.injections.lock().is_empty());
    }

    #[tokio::test]
    async fn test_phishing_verdict_injects_phishing_banner() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"PHISHING"}}}"#).await;
        let host = RecordingHost::new();
        let engine = engine_with(&endpoint, host.clone());

        engine
            .on_request(post_event("https://lure.example/verify", b"password=1"))
            .await;

        assert_eq!(engine.stats().alerts, 1);
        let injections = host.injections.lock();
        assert_eq!(injections.as_slice(), &[(7, WarningBanner::Phishing)]);
    }

    #[tokio::test]
    async fn test_unrecognized_response_shape_is_unknown_verdict() {
        let endpoint = spawn_stub(r#"{"hello":"world"}"#).await;
        let engine = engine_with(&endpoint, Arc::new(NullHost));

        engine
            .on_request(post_event("https://odd.example/", b"a=1"))
            .await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.stats.requests, 1);
        assert_eq!(snapshot.traffic_log.len(), 1);
        assert_eq!(snapshot.traffic_log[0].classification, Verdict::Unknown);
        assert!(snapshot.alerts_log.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend_drops_event_after_counting() {
        let engine = engine_with("http://127.0.0.1:9/predict", Arc::new(NullHost));

        engine
            .on_request(post_event("https://site.example/", b"a=1"))
            .await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.stats.requests, 1);
        assert_eq!(snapshot.stats.alerts, 0);
        assert!(snapshot.traffic_log.is_empty());
        assert!(snapshot.alerts_log.is_empty());
    }

    #[tokio::test]
    async fn test_monitoring_disabled_bypasses_pipeline() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"bad"}}}"#).await;
        let engine = engine_with(&endpoint, Arc::new(NullHost));

        engine.set_monitoring(false);
        engine
            .on_request(post_event("https://evil.example/", b"x"))
            .await;

        assert_eq!(engine.stats().requests, 0);
        assert!(engine.snapshot().traffic_log.is_empty());

        engine.set_monitoring(true);
        engine
            .on_request(post_event("https://evil.example/", b"x"))
            .await;
        assert_eq!(engine.stats().requests, 1);
    }

    #[tokio::test]
    async fn test_excluded_urls_never_reach_the_pipeline() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"bad"}}}"#).await;
        let engine = engine_with(&endpoint, Arc::new(NullHost));

        let excluded = [
            endpoint.clone(),
            "chrome-extension://abcdef/popup.html".to_string(),
            "https://cdn.example/v1/traces".to_string(),
            "https://site.example/analytics?id=1".to_string(),
            "https://site.example/telemetry/batch".to_string(),
        ];
        for url in &excluded {
            engine.on_request(post_event(url, b"x")).await;
        }

        assert_eq!(engine.stats().requests, 0);
        assert!(engine.snapshot().traffic_log.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_domain_counts_without_classification() {
        let engine = engine_with("http://127.0.0.1:9/predict", Arc::new(NullHost));
        engine.block_domain("evil.example");

        engine
            .on_request(post_event("https://evil.example/anything", b"x"))
            .await;

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.stats.blocked, 1);
        assert_eq!(snapshot.stats.requests, 0);
        assert!(snapshot.traffic_log.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_persisted_after_processing() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"bad"}}}"#).await;
        let storage = Arc::new(Storage::open_in_memory().unwrap());
        let config = EngineConfig {
            classifier: ClassifierConfig {
                endpoint,
                timeout_seconds: 2,
            },
            ..Default::default()
        };
        let engine = Engine::new(storage.clone(), Arc::new(NullHost), config);

        engine
            .on_request(post_event("https://evil.example/login", b"' OR 1=1"))
            .await;

        let stats: crate::logic::store::Stats = storage.get(crate::constants::keys::STATS).unwrap();
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.alerts, 1);
        let alerts: Vec<AlertEntry> = storage.get(crate::constants::keys::ALERTS_LOG).unwrap();
        assert_eq!(alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_no_banner_for_tabless_request() {
        let endpoint = spawn_stub(r#"{"results":{"stacked":{"prediction":"bad"}}}"#).await;
        let host = RecordingHost::new();
        let engine = engine_with(&endpoint, host.clone());

        let event = RequestEvent::new("https://evil.example/", "POST", Some(b"x".to_vec()), -1);
        engine.on_request(event).await;

        assert_eq!(engine.stats().alerts, 1);
        assert!(host.injections.lock().is_empty());
    }
}
