//! Expense classification
//!
//! The categorization cascade and its tiers:
//!
//! - `Classifier` trait: interface to the remote text-classification oracle
//! - `ClassifierClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - `RemoteClassifier`: HTTP adapter with a bounded timeout
//! - `MockClassifier`: configurable backend for tests
//! - `keywords`: deterministic rule-based tier
//! - `CategoryResolver`: the ordered fallback chain itself
//!
//! # Configuration
//!
//! Environment variables:
//! - `SPENDWISE_CLASSIFIER_URL`: oracle endpoint (required for the remote backend)

pub mod keywords;
mod mock;
mod remote;
mod resolver;

pub use mock::MockClassifier;
pub use remote::RemoteClassifier;
pub use resolver::CategoryResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A raw classification from an oracle backend: the winning label and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierScore {
    pub label: String,
    pub confidence: f64,
}

/// Interface to a remote text-classification oracle
///
/// Implementations must be Send + Sync for use across async tasks. The
/// contract is fail-fast: a slow or broken oracle returns
/// `ClassifierUnavailable`/`ClassifierError` within the configured timeout
/// rather than stalling the caller.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `text` against the candidate label set
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<ClassifierScore>;

    /// Check whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Endpoint URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete classifier client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ClassifierClient {
    /// HTTP oracle backend
    Remote(RemoteClassifier),
    /// Mock backend for testing
    Mock(MockClassifier),
}

impl ClassifierClient {
    /// Create a client from environment variables, with the caller's call
    /// timeout (normally `ClassifierConfig::timeout_secs`)
    ///
    /// Returns None when `SPENDWISE_CLASSIFIER_URL` is not set; the resolver
    /// then runs keyword-only, which is a supported degraded mode.
    pub fn from_env(timeout_secs: u64) -> Option<Self> {
        RemoteClassifier::from_env(timeout_secs).map(ClassifierClient::Remote)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ClassifierClient::Mock(MockClassifier::new())
    }
}

#[async_trait]
impl Classifier for ClassifierClient {
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<ClassifierScore> {
        match self {
            ClassifierClient::Remote(b) => b.classify(text, candidate_labels).await,
            ClassifierClient::Mock(b) => b.classify(text, candidate_labels).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ClassifierClient::Remote(b) => b.health_check().await,
            ClassifierClient::Mock(b) => b.health_check().await,
        }
    }

    fn host(&self) -> &str {
        match self {
            ClassifierClient::Remote(b) => b.host(),
            ClassifierClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_client_host() {
        let client = ClassifierClient::mock();
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = ClassifierClient::mock();
        assert!(client.health_check().await);
    }
}
