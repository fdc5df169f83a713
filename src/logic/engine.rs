//! Background Engine
//!
//! The one owner of all shared mutable state: stats, the three rolling
//! logs, the redirect map, the blocklist, and the monitoring flag. The
//! browser host drives it through the event handlers in `interceptor` and
//! `navigation`; everything downstream of a verdict happens in here.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::constants::{self, keys};
use crate::logic::blocklist::Blocklist;
use crate::logic::classify::{AlertPolicy, ClassifierClient, ClassifierConfig};
use crate::logic::events::{EventBus, UiEvent};
use crate::logic::host::{HostBridge, TabId, WarningBanner};
use crate::logic::monitor::MonitorFlag;
use crate::logic::redirects::RedirectTracker;
use crate::logic::storage::Storage;
use crate::logic::store::{LogStore, Snapshot, Stats};

// ============================================================================
// CONFIG
// ============================================================================

/// Per-instance engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub policy: AlertPolicy,
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            policy: AlertPolicy::default(),
            event_capacity: constants::EVENT_CHANNEL_CAPACITY,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// The background engine.
pub struct Engine {
    pub(crate) storage: Arc<Storage>,
    pub(crate) host: Arc<dyn HostBridge>,
    pub(crate) store: Mutex<LogStore>,
    pub(crate) redirects: Mutex<RedirectTracker>,
    pub(crate) blocklist: Mutex<Blocklist>,
    pub(crate) monitor: MonitorFlag,
    pub(crate) classifier: ClassifierClient,
    pub(crate) policy: AlertPolicy,
    pub(crate) events: EventBus,
}

impl Engine {
    /// Build the engine, restoring all persisted state from storage.
    pub fn new(storage: Arc<Storage>, host: Arc<dyn HostBridge>, config: EngineConfig) -> Self {
        let snapshot = Snapshot {
            stats: storage.get(keys::STATS).unwrap_or_default(),
            traffic_log: storage.get(keys::TRAFFIC_LOG).unwrap_or_default(),
            alerts_log: storage.get(keys::ALERTS_LOG).unwrap_or_default(),
            recent_alerts: storage.get(keys::RECENT_ALERTS).unwrap_or_default(),
        };

        let monitor = MonitorFlag::init(&storage);
        let blocklist = Blocklist::load(&storage);

        log::info!(
            "🛡️ {} v{} background engine ready ({} traffic entries, {} alerts restored)",
            constants::APP_NAME,
            constants::APP_VERSION,
            snapshot.traffic_log.len(),
            snapshot.alerts_log.len()
        );

        Self {
            storage,
            host,
            store: Mutex::new(LogStore::from_snapshot(snapshot)),
            redirects: Mutex::new(RedirectTracker::new()),
            blocklist: Mutex::new(blocklist),
            monitor,
            classifier: ClassifierClient::new(config.classifier),
            policy: config.policy,
            events: EventBus::new(config.event_capacity),
        }
    }

    /// Subscribe a UI listener to snapshot/page-feature events.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Current aggregate counters.
    pub fn stats(&self) -> Stats {
        self.store.lock().stats().clone()
    }

    /// Current full snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.store.lock().snapshot()
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_enabled()
    }

    /// Flip the monitoring flag (writes through to storage).
    pub fn set_monitoring(&self, enabled: bool) {
        self.monitor.set(&self.storage, enabled);
    }

    /// Add a domain to the persisted blocklist (deduplicated).
    pub fn block_domain(&self, domain: &str) {
        let mut blocklist = self.blocklist.lock();
        if blocklist.block(domain) {
            log::info!("Domain blocked: {}", domain);
            blocklist.save(&self.storage);
        }
    }

    /// Remove a domain from the persisted blocklist.
    pub fn unblock_domain(&self, domain: &str) {
        let mut blocklist = self.blocklist.lock();
        if blocklist.unblock(domain) {
            log::info!("Domain unblocked: {}", domain);
            blocklist.save(&self.storage);
        }
    }

    pub fn is_blocked(&self, domain: &str) -> bool {
        self.blocklist.lock().contains(domain)
    }

    /// Persist the current snapshot and broadcast it to live listeners.
    ///
    /// Both halves are best-effort: a failed write is logged and the next
    /// event will try again; absent listeners are not an error.
    pub(crate) fn publish(&self) {
        let snapshot = self.store.lock().snapshot();
        self.persist(&snapshot);
        self.events.emit(UiEvent::StatsUpdate(snapshot));
    }

    fn persist(&self, snapshot: &Snapshot) {
        let writes = [
            self.storage.set(keys::STATS, &snapshot.stats),
            self.storage.set(keys::TRAFFIC_LOG, &snapshot.traffic_log),
            self.storage.set(keys::ALERTS_LOG, &snapshot.alerts_log),
            self.storage.set(keys::RECENT_ALERTS, &snapshot.recent_alerts),
        ];
        for e in writes.into_iter().filter_map(Result::err) {
            log::error!("Snapshot write failed: {}", e);
        }
    }

    /// Fire-and-forget banner injection; a vanished tab is a debug line.
    pub(crate) fn notify_inject(&self, tab_id: TabId, banner: WarningBanner) {
        if let Err(e) = self.host.inject_warning(tab_id, banner) {
            log::debug!("Banner injection skipped: {}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
