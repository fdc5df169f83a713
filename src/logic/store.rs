//! Rolling Log Store
//!
//! Bounded, insertion-ordered logs plus aggregate counters. Owns every
//! mutation rule: front insertion, FIFO eviction past each cap, and the
//! exact incremental latency mean. No I/O here - persistence and broadcast
//! happen one layer up, off a snapshot.

use std::collections::VecDeque;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ALERT_ENTRIES, MAX_RECENT_ALERTS, MAX_TRAFFIC_ENTRIES};
use crate::logic::classify::Verdict;
use crate::logic::features::RequestFeatures;

// ============================================================================
// ENTRY TYPES
// ============================================================================

/// Aggregate counters since process start.
///
/// `alerts` counts alert insertions, not the capped log length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub requests: u64,
    pub blocked: u64,
    pub alerts: u64,
    pub avg_time: u64,
}

/// One line of the traffic log - every classified request lands here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEntry {
    pub time: String,
    pub url: String,
    pub method: String,
    pub classification: Verdict,
}

/// Full alert record, features retained verbatim for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub id: i64,
    pub domain: String,
    pub classification: Verdict,
    pub method: String,
    pub path: String,
    pub features: RequestFeatures,
}

/// Lightweight parallel record for badge/summary display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAlert {
    pub time: String,
    pub url: String,
    pub method: String,
    pub classification: Verdict,
}

/// The full persisted/broadcast copy of stats plus all three logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub stats: Stats,
    pub traffic_log: Vec<TrafficEntry>,
    pub alerts_log: Vec<AlertEntry>,
    pub recent_alerts: Vec<RecentAlert>,
}

/// Wall-clock time string for log entries, popup display format.
pub fn entry_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

// ============================================================================
// LOG STORE
// ============================================================================

/// In-memory authoritative copy of the logs and counters.
#[derive(Debug, Default)]
pub struct LogStore {
    stats: Stats,
    traffic: VecDeque<TrafficEntry>,
    alerts: VecDeque<AlertEntry>,
    recent: VecDeque<RecentAlert>,
    last_alert_id: i64,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the in-memory copy from a persisted snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let last_alert_id = snapshot.alerts_log.iter().map(|a| a.id).max().unwrap_or(0);
        Self {
            stats: snapshot.stats,
            traffic: snapshot.traffic_log.into(),
            alerts: snapshot.alerts_log.into(),
            recent: snapshot.recent_alerts.into(),
            last_alert_id,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Called once per admitted request, before feature extraction, so a
    /// failed pipeline still reflects an attempted request.
    pub fn increment_request_count(&mut self) {
        self.stats.requests += 1;
    }

    /// Called once per blocked-domain hit.
    pub fn increment_blocked_count(&mut self) {
        self.stats.blocked += 1;
    }

    /// Fold one measured round trip into the running average.
    ///
    /// Exact incremental mean over the request counter at the moment of
    /// update: avg' = round((avg*(n-1) + elapsed) / n).
    pub fn update_avg_time(&mut self, elapsed_ms: u64) {
        let n = self.stats.requests;
        if n <= 1 {
            self.stats.avg_time = elapsed_ms;
        } else {
            let sum = self.stats.avg_time * (n - 1) + elapsed_ms;
            self.stats.avg_time = (sum as f64 / n as f64).round() as u64;
        }
    }

    /// Append to the front of the traffic log, evicting past the cap.
    pub fn record_traffic(&mut self, entry: TrafficEntry) {
        self.traffic.push_front(entry);
        self.traffic.truncate(MAX_TRAFFIC_ENTRIES);
    }

    /// Record an alert: bumps the alerts counter and inserts the full entry
    /// and its summary at the front of their logs.
    ///
    /// Returns the assigned alert id - creation-time epoch millis, bumped
    /// past the previous id when two alerts land in the same millisecond.
    pub fn record_alert(&mut self, mut entry: AlertEntry, summary: RecentAlert) -> i64 {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let id = now_ms.max(self.last_alert_id + 1);
        self.last_alert_id = id;
        entry.id = id;

        self.stats.alerts += 1;

        self.alerts.push_front(entry);
        self.alerts.truncate(MAX_ALERT_ENTRIES);

        self.recent.push_front(summary);
        self.recent.truncate(MAX_RECENT_ALERTS);

        id
    }

    /// Clone out the full snapshot for persistence and broadcast.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            stats: self.stats.clone(),
            traffic_log: self.traffic.iter().cloned().collect(),
            alerts_log: self.alerts.iter().cloned().collect(),
            recent_alerts: self.recent.iter().cloned().collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
