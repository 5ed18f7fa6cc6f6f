//! Categorization resolver: the fallback cascade
//!
//! Orders the classification strategies as a pure try-chain: manual
//! override, then the remote oracle, then the keyword table, then the
//! `Other` floor. Each tier is an independent function returning
//! hit-or-miss, so adding or removing a tier is a one-line change to
//! `resolve`. The resolver is total: every description resolves to some
//! category, and oracle failures surface only through the result's
//! `method`/`confidence` fields, never as errors.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::ClassifierConfig;
use crate::models::{CategorizationMethod, CategorizationResult, Category};

use super::{Classifier, ClassifierClient};

/// Resolves categories for expense descriptions via the fallback cascade
pub struct CategoryResolver {
    client: Option<ClassifierClient>,
    config: ClassifierConfig,
}

impl CategoryResolver {
    /// Create a resolver; `client = None` runs keyword-only (degraded mode)
    pub fn new(client: Option<ClassifierClient>, config: ClassifierConfig) -> Self {
        Self { client, config }
    }

    /// Keyword-only resolver with default policy (no oracle configured)
    pub fn offline() -> Self {
        Self::new(None, ClassifierConfig::default())
    }

    /// Candidate labels offered to the oracle (and to manual-override UIs)
    pub fn candidate_labels() -> Vec<&'static str> {
        Category::all().iter().map(|c| c.label()).collect()
    }

    /// Resolve a category for one expense
    ///
    /// `amount_cents` is accepted as an auxiliary signal for future tiers;
    /// the current cascade classifies on description alone.
    pub async fn resolve(
        &self,
        description: &str,
        _amount_cents: i64,
        manual_category: Option<Category>,
    ) -> CategorizationResult {
        if let Some(result) = manual_tier(manual_category) {
            return result;
        }
        if let Some(result) = self.remote_tier(description).await {
            return result;
        }
        if let Some(result) = keyword_tier(description, self.config.keyword_confidence) {
            return result;
        }
        floor_tier(self.config.floor_confidence)
    }

    /// Resolve a batch of descriptions
    ///
    /// Results preserve input order. Items are resolved independently; a
    /// failing oracle degrades single items to lower tiers without
    /// aborting the batch.
    pub async fn resolve_batch(&self, descriptions: &[String]) -> Vec<CategorizationResult> {
        let mut results = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            results.push(self.resolve(description, 0, None).await);
        }
        results
    }

    /// Tier 2: remote oracle, accepted only above the confidence bar
    async fn remote_tier(&self, description: &str) -> Option<CategorizationResult> {
        let client = self.client.as_ref()?;
        let labels = Self::candidate_labels();

        let score = match client.classify(description, &labels).await {
            Ok(score) => score,
            Err(e) => {
                debug!(error = %e, "Oracle call failed, falling back");
                return None;
            }
        };

        let category = match Category::from_str(&score.label) {
            Ok(category) => category,
            Err(_) => {
                warn!(label = %score.label, "Oracle returned unknown label, falling back");
                return None;
            }
        };

        if score.confidence < self.config.acceptance_threshold {
            debug!(
                confidence = score.confidence,
                threshold = self.config.acceptance_threshold,
                "Oracle confidence below acceptance threshold, falling back"
            );
            return None;
        }

        Some(CategorizationResult {
            category,
            confidence: score.confidence,
            method: CategorizationMethod::ExternalClassifier,
            rationale: None,
        })
    }
}

/// Tier 1: user-supplied category short-circuits everything
fn manual_tier(manual_category: Option<Category>) -> Option<CategorizationResult> {
    manual_category.map(|category| CategorizationResult {
        category,
        confidence: 1.0,
        method: CategorizationMethod::Manual,
        rationale: None,
    })
}

/// Tier 3: deterministic keyword-table match
fn keyword_tier(description: &str, confidence: f64) -> Option<CategorizationResult> {
    super::keywords::keyword_match(description).map(|(category, keyword)| CategorizationResult {
        category,
        confidence,
        method: CategorizationMethod::KeywordMatch,
        rationale: Some(format!("matched keyword \"{}\"", keyword)),
    })
}

/// Tier 4: the guaranteed floor, every expense gets *some* category
fn floor_tier(confidence: f64) -> CategorizationResult {
    CategorizationResult {
        category: Category::Other,
        confidence,
        method: CategorizationMethod::KeywordMatch,
        rationale: Some("no keyword matched".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MockClassifier;

    fn resolver_with(mock: MockClassifier) -> CategoryResolver {
        CategoryResolver::new(
            Some(ClassifierClient::Mock(mock)),
            ClassifierConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_manual_category_short_circuits() {
        // Even a dead oracle never sees a manually categorized expense
        let resolver = resolver_with(MockClassifier::unavailable());
        let result = resolver
            .resolve("NETFLIX.COM", 1599, Some(Category::Utilities))
            .await;
        assert_eq!(result.category, Category::Utilities);
        assert_eq!(result.method, CategorizationMethod::Manual);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_oracle_accepted_above_threshold() {
        let resolver = resolver_with(MockClassifier::fixed("Healthcare", 0.81));
        let result = resolver.resolve("some pharmacy visit", 2000, None).await;
        assert_eq!(result.category, Category::Healthcare);
        assert_eq!(result.method, CategorizationMethod::ExternalClassifier);
        assert!((result.confidence - 0.81).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_low_confidence_falls_to_keywords() {
        let resolver = resolver_with(MockClassifier::fixed("Healthcare", 0.2));
        let result = resolver.resolve("coffee with friends", 450, None).await;
        assert_eq!(result.category, Category::FoodDining);
        assert_eq!(result.method, CategorizationMethod::KeywordMatch);
        assert!((result.confidence - 0.6).abs() < f64::EPSILON);
        assert!(result.rationale.unwrap().contains("coffee"));
    }

    #[tokio::test]
    async fn test_oracle_failure_never_yields_external_method() {
        let resolver = resolver_with(MockClassifier::unavailable());
        let result = resolver.resolve("uber ride", 1200, None).await;
        assert_ne!(result.method, CategorizationMethod::ExternalClassifier);
        assert_eq!(result.category, Category::Transportation);
    }

    #[tokio::test]
    async fn test_unknown_oracle_label_falls_through() {
        let resolver = resolver_with(MockClassifier::fixed("Cryptozoology", 0.99));
        let result = resolver.resolve("uber ride", 1200, None).await;
        assert_eq!(result.category, Category::Transportation);
        assert_eq!(result.method, CategorizationMethod::KeywordMatch);
    }

    #[tokio::test]
    async fn test_totality_floor() {
        let resolver = resolver_with(MockClassifier::unavailable());
        let result = resolver.resolve("zzzz unclassifiable 42", 100, None).await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.method, CategorizationMethod::KeywordMatch);
        assert!((result.confidence - 0.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_offline_resolver_totality() {
        let resolver = CategoryResolver::offline();
        for description in ["grocery run", "weird stuff", ""] {
            let result = resolver.resolve(description, 0, None).await;
            // Always resolves to something
            assert!(result.confidence > 0.0);
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let resolver = resolver_with(MockClassifier::unavailable());
        let descriptions = vec![
            "starbucks latte".to_string(),
            "mystery charge".to_string(),
            "amazon order".to_string(),
        ];
        let results = resolver.resolve_batch(&descriptions).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].category, Category::FoodDining);
        assert_eq!(results[1].category, Category::Other);
        assert_eq!(results[2].category, Category::Shopping);
    }
}
