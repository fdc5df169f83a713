//! Verdict Taxonomy
//!
//! The classifier's output label, canonicalized once at classification time
//! and consumed everywhere downstream. Label families `bad`/`malicious`
//! collapse into one malicious tier; anything unrecognized is `Unknown`.

use serde::{Deserialize, Serialize};

// ============================================================================
// VERDICT
// ============================================================================

/// Classification tiers for a request or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Nothing to report
    Safe,
    /// Malicious traffic, alert immediately
    Malicious,
    /// Phishing page or credential lure
    Phishing,
    /// Worth watching, below the alert bar by default
    Suspicious,
    /// Classifier unreachable or label unrecognized
    Unknown,
}

impl Verdict {
    /// Canonicalize a raw classifier label (case-insensitive).
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "safe" | "good" | "benign" => Verdict::Safe,
            "bad" | "malicious" => Verdict::Malicious,
            "phishing" => Verdict::Phishing,
            "suspicious" => Verdict::Suspicious,
            _ => Verdict::Unknown,
        }
    }

    /// Pull the verdict out of a raw classifier response body.
    ///
    /// Expected shape: `{ results: { stacked: { prediction: <label> } } }`.
    /// Any other shape degrades to `Unknown`.
    pub fn from_response(body: &serde_json::Value) -> Self {
        body.get("results")
            .and_then(|r| r.get("stacked"))
            .and_then(|s| s.get("prediction"))
            .and_then(|p| p.as_str())
            .map(Verdict::parse)
            .unwrap_or(Verdict::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Malicious => "malicious",
            Verdict::Phishing => "phishing",
            Verdict::Suspicious => "suspicious",
            Verdict::Unknown => "unknown",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            Verdict::Safe | Verdict::Unknown => 0,
            Verdict::Suspicious => 1,
            Verdict::Phishing => 2,
            Verdict::Malicious => 3,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ALERT POLICY
// ============================================================================

/// Which tiers raise an alert entry (and a warning banner).
///
/// Malicious always alerts. The other two tiers are explicit choices: the
/// shipped default alerts on phishing but only watches suspicious traffic.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    pub alert_on_phishing: bool,
    pub alert_on_suspicious: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            alert_on_phishing: true,
            alert_on_suspicious: false,
        }
    }
}

impl AlertPolicy {
    pub fn should_alert(&self, verdict: Verdict) -> bool {
        match verdict {
            Verdict::Malicious => true,
            Verdict::Phishing => self.alert_on_phishing,
            Verdict::Suspicious => self.alert_on_suspicious,
            Verdict::Safe | Verdict::Unknown => false,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
