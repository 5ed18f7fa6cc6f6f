//! Remote classifier oracle adapter
//!
//! HTTP client for a zero-shot text-classification service. This is a pure
//! I/O boundary: it enforces a bounded call timeout, translates transport
//! and decode failures into the engine's error taxonomy, and never retries;
//! retry policy belongs to the resolver, whose default is immediate fallback
//! to the next tier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{Classifier, ClassifierScore};

/// HTTP backend for the classification oracle
///
/// Wire contract: POST `{base_url}/classify` with
/// `{"text": ..., "candidate_labels": [...]}`; the response is
/// `{"label": ..., "confidence": ...}`.
#[derive(Clone)]
pub struct RemoteClassifier {
    http_client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl RemoteClassifier {
    /// Create a new remote classifier with the given call timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        // Client construction only fails on TLS backend misconfiguration;
        // fall back to the default client (no timeout) rather than panicking.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    /// Create from environment variables, with the caller's call timeout
    pub fn from_env(timeout_secs: u64) -> Option<Self> {
        let url = std::env::var("SPENDWISE_CLASSIFIER_URL").ok()?;
        Some(Self::new(&url, timeout_secs))
    }

    /// The configured call timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

/// Request to the oracle
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
    candidate_labels: &'a [&'a str],
}

/// Response from the oracle
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    confidence: f64,
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<ClassifierScore> {
        let request = ClassifyRequest {
            text,
            candidate_labels,
        };

        let response = self
            .http_client
            .post(format!("{}/classify", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    Error::ClassifierUnavailable(e.to_string())
                } else {
                    Error::ClassifierError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::ClassifierError(format!(
                "oracle returned status {}",
                response.status()
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| Error::ClassifierError(format!("malformed oracle response: {}", e)))?;

        if !(0.0..=1.0).contains(&body.confidence) {
            return Err(Error::ClassifierError(format!(
                "oracle confidence out of range: {}",
                body.confidence
            )));
        }

        debug!(label = %body.label, confidence = body.confidence, "Oracle classification");

        Ok(ClassifierScore {
            label: body.label,
            confidence: body.confidence,
        })
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = RemoteClassifier::new("http://localhost:9000/", 2);
        assert_eq!(client.host(), "http://localhost:9000");
    }

    #[test]
    fn test_from_env() {
        // Single test owns the env var to avoid races with parallel tests
        std::env::remove_var("SPENDWISE_CLASSIFIER_URL");
        assert!(RemoteClassifier::from_env(2).is_none());

        std::env::set_var("SPENDWISE_CLASSIFIER_URL", "http://localhost:9000");
        let client = RemoteClassifier::from_env(7).unwrap();
        assert_eq!(client.host(), "http://localhost:9000");
        // The caller's timeout is honored, not a hardcoded default
        assert_eq!(client.timeout_secs(), 7);
        std::env::remove_var("SPENDWISE_CLASSIFIER_URL");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        // Port 9 (discard) is not listening; expect a connect failure
        let client = RemoteClassifier::new("http://127.0.0.1:9", 1);
        let result = client.classify("coffee", &["Food & Dining"]).await;
        match result {
            Err(Error::ClassifierUnavailable(_)) => {}
            other => panic!("expected ClassifierUnavailable, got {:?}", other.map(|_| ())),
        }
    }
}
