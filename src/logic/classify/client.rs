//! Classifier API Client
//!
//! HTTP bridge to the remote model server. One POST per request event, no
//! retry, no backoff: any failure means "unavailable" and the event is
//! dropped from alerting upstream.

use std::time::{Duration, Instant};

use crate::constants;
use crate::logic::features::RequestFeatures;

use super::verdict::Verdict;

// ============================================================================
// CONFIG
// ============================================================================

/// Classifier endpoint configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::get_classifier_url(),
            timeout_seconds: constants::get_classify_timeout_secs(),
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// A normalized verdict plus the measured round-trip latency.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub verdict: Verdict,
    pub elapsed_ms: u64,
}

/// Classifier API client
pub struct ClassifierClient {
    config: ClassifierConfig,
    http_client: reqwest::Client,
}

impl ClassifierClient {
    /// Create a new client with a bounded request timeout.
    pub fn new(config: ClassifierConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// The configured endpoint (also part of the self-traffic exclusion set).
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Send one feature record to the classifier and normalize the verdict.
    ///
    /// Latency is measured over the full round trip and reported for every
    /// successful exchange, including ones whose label normalizes to
    /// `Unknown`. Concurrent calls share nothing but the connection pool.
    pub async fn classify(
        &self,
        features: &RequestFeatures,
    ) -> Result<Classification, ClassifyError> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .json(features)
            .send()
            .await
            .map_err(|e| ClassifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifyError::Server(response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClassifyError::Parse(e.to_string()))?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let verdict = Verdict::from_response(&body);

        Ok(Classification {
            verdict,
            elapsed_ms,
        })
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Classifier client errors - all of them mean "unavailable" to the pipeline.
#[derive(Debug, Clone)]
pub enum ClassifyError {
    Network(String),
    Server(u16),
    Parse(String),
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Server(code) => write!(f, "Server error: {}", code),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ClassifyError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interceptor::RequestEvent;

    fn sample_features() -> RequestFeatures {
        let ev = RequestEvent::new("https://example.com/login", "POST", Some(b"a=1".to_vec()), 1);
        crate::logic::features::extract_request_features(&ev)
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Reserved discard port, nothing listens there.
        let client = ClassifierClient::new(ClassifierConfig {
            endpoint: "http://127.0.0.1:9/predict".to_string(),
            timeout_seconds: 1,
        });

        let err = client.classify(&sample_features()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Network(_)));
    }

    #[test]
    fn test_default_config_reads_constants() {
        let config = ClassifierConfig::default();
        assert!(config.endpoint.ends_with("/predict"));
        assert!(config.timeout_seconds >= 1);
    }
}
