//! Request Feature Extraction
//!
//! Turns one intercepted request into the fixed-shape record the classifier
//! expects. Counters are independent scans over the decoded body; the badword
//! counter is a presence test against a fixed SQL-injection dictionary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::logic::interceptor::RequestEvent;

// ============================================================================
// DICTIONARY & PATTERNS
// ============================================================================

/// SQL-injection indicative tokens. Matched case-insensitively, each term
/// counted at most once per body.
const BADWORDS: [&str; 17] = [
    "sleep", "uid", "select", "waitfor", "delay",
    "system", "union", "order by", "group by",
    "admin", "drop", "script", "insert", "update",
    "delete", "xp_", "or 1=1",
];

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("whitespace pattern"));
static RE_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("braces pattern"));
static RE_ANGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").expect("angle pattern"));
static RE_SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@#$^&*]").expect("special pattern"));

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// Fixed-shape feature record for one request.
///
/// Sent verbatim to the classifier and retained verbatim inside an alert
/// entry for audit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFeatures {
    pub method: String,
    pub path: String,
    pub body: String,
    pub single_q: usize,
    pub double_q: usize,
    pub dashes: usize,
    pub braces: usize,
    pub spaces: usize,
    pub percentages: usize,
    pub semicolons: usize,
    pub angle_brackets: usize,
    pub special_chars: usize,
    pub path_length: usize,
    pub body_length: usize,
    pub badwords_count: usize,
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract the feature record from an intercepted request event.
///
/// Unparseable URLs degrade to an empty path; a body that is not valid UTF-8
/// is treated as empty. This function never fails.
pub fn extract_request_features(event: &RequestEvent) -> RequestFeatures {
    let path = url::Url::parse(&event.url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();

    let body = event
        .body
        .as_deref()
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or("")
        .to_string();

    let body_lower = body.to_lowercase();

    RequestFeatures {
        method: event.method.clone(),
        single_q: body.matches('\'').count(),
        double_q: body.matches('"').count(),
        dashes: body.matches("--").count(),
        braces: RE_BRACES.find_iter(&body).count(),
        spaces: RE_WHITESPACE.find_iter(&body).count(),
        percentages: body.matches('%').count(),
        semicolons: body.matches(';').count(),
        angle_brackets: RE_ANGLE.find_iter(&body).count(),
        special_chars: RE_SPECIAL.find_iter(&body).count(),
        path_length: path.chars().count(),
        body_length: body.chars().count(),
        badwords_count: BADWORDS
            .iter()
            .filter(|word| body_lower.contains(*word))
            .count(),
        path,
        body,
    }
}

// ============================================================================
// TESTS
// ============================================================================
