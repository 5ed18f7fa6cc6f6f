//! Engine policy configuration
//!
//! Every threshold the engine applies (confidence cutoffs, anomaly
//! criteria, materiality) is a named, overridable constant here rather
//! than a literal buried in logic. Values load from a TOML file when one
//! is provided and fall back to the design defaults otherwise.
//!
//! ```toml
//! [classifier]
//! acceptance_threshold = 0.5
//! timeout_secs = 2
//!
//! [analytics]
//! anomaly_sigma = 2.0
//! concentration_threshold = 0.35
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Category;

/// Classifier cascade policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum oracle confidence to accept an external classification
    pub acceptance_threshold: f64,
    /// Fixed confidence assigned to keyword-table matches
    pub keyword_confidence: f64,
    /// Confidence of the guaranteed `Other` floor fallback
    pub floor_confidence: f64,
    /// Bounded timeout for the oracle call; on expiry the cascade falls
    /// through immediately, no retry
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.5,
            keyword_confidence: 0.6,
            floor_confidence: 0.1,
            timeout_secs: 2,
        }
    }
}

/// Analytics and insight policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Standard deviations above the category mean before an expense is anomalous
    pub anomaly_sigma: f64,
    /// Categories with fewer expenses than this in the window are never flagged
    pub anomaly_min_samples: usize,
    /// Fraction of total spend a category must reach to trigger a
    /// high-concentration insight
    pub concentration_threshold: f64,
    /// Daily average spend (cents) above which the velocity insight fires
    pub velocity_daily_cents: i64,
    /// Default estimated-savings rate applied to a flagged category's total
    pub default_savings_rate: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            anomaly_sigma: 2.0,
            anomaly_min_samples: 3,
            concentration_threshold: 0.35,
            velocity_daily_cents: 5_000,
            default_savings_rate: 0.20,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub analytics: AnalyticsConfig,
}

impl EngineConfig {
    /// Load from a TOML file; missing keys take their defaults
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Category-dependent savings rate for recommendations
    ///
    /// Dining suggests meal planning at a conservative 15%; entertainment is
    /// the most discretionary at 25%; everything else uses the default rate.
    pub fn savings_rate(&self, category: Category) -> f64 {
        match category {
            Category::FoodDining => 0.15,
            Category::Entertainment => 0.25,
            _ => self.analytics.default_savings_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.classifier.acceptance_threshold - 0.5).abs() < f64::EPSILON);
        assert!((config.classifier.keyword_confidence - 0.6).abs() < f64::EPSILON);
        assert!((config.classifier.floor_confidence - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.classifier.timeout_secs, 2);
        assert_eq!(config.analytics.anomaly_min_samples, 3);
        assert!((config.analytics.concentration_threshold - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: EngineConfig = toml::from_str(
            r#"
            [classifier]
            acceptance_threshold = 0.7

            [analytics]
            anomaly_sigma = 3.0
            "#,
        )
        .unwrap();
        assert!((config.classifier.acceptance_threshold - 0.7).abs() < f64::EPSILON);
        // Unspecified keys keep their defaults
        assert!((config.classifier.keyword_confidence - 0.6).abs() < f64::EPSILON);
        assert!((config.analytics.anomaly_sigma - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.analytics.anomaly_min_samples, 3);
    }

    #[test]
    fn test_savings_rates() {
        let config = EngineConfig::default();
        assert!((config.savings_rate(Category::FoodDining) - 0.15).abs() < f64::EPSILON);
        assert!((config.savings_rate(Category::Entertainment) - 0.25).abs() < f64::EPSILON);
        assert!((config.savings_rate(Category::Shopping) - 0.20).abs() < f64::EPSILON);
    }
}
