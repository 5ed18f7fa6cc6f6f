//! Report types for the analytics engine

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Priority tier for insights and recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Numeric rank for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category spend within the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: Category,
    pub total_cents: i64,
    pub expense_count: usize,
    /// Share of total window spend, in percent
    pub percentage: f64,
}

/// Categorization-quality stats over the window's expenses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiPerformance {
    pub external_count: usize,
    pub keyword_count: usize,
    pub manual_count: usize,
    /// Mean confidence over expenses with a positive confidence
    pub average_confidence: f64,
    /// Expenses with confidence above 0.8
    pub high_confidence_count: usize,
}

/// An expense flagged as statistically unusual for its category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub expense_id: i64,
    pub description: String,
    pub category: Category,
    pub amount_cents: i64,
    /// Mean of the category's other expenses in the window
    pub category_mean_cents: f64,
    /// The threshold the amount exceeded
    pub threshold_cents: f64,
}

/// Kinds of generated insight statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// One category dominates window spend
    HighConcentration,
    /// Daily average spend is running high
    SpendingVelocity,
    /// The classifier cascade is mostly resolving at the oracle tier
    AiEfficiency,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::HighConcentration => "high_concentration",
            InsightKind::SpendingVelocity => "spending_velocity",
            InsightKind::AiEfficiency => "ai_efficiency",
        }
    }
}

/// A natural-language statement generated from window aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub content: String,
    pub confidence: f64,
    pub priority: Priority,
    pub action_items: Vec<String>,
}

/// An actionable suggestion, usually paired with an insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    /// Heuristic estimate; None when no dollar figure applies
    pub estimated_savings_cents: Option<i64>,
    pub actions: Vec<String>,
}

/// The full analytics output for one owner + window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window_days: u32,
    pub expense_count: usize,
    pub total_cents: i64,
    pub breakdown: Vec<CategorySlice>,
    pub ai_performance: AiPerformance,
    pub anomalies: Vec<Anomaly>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisReport {
    /// The empty report for a window with no expenses
    pub fn empty(window_days: u32) -> Self {
        Self {
            window_days,
            expense_count: 0,
            total_cents: 0,
            breakdown: Vec::new(),
            ai_performance: AiPerformance::default(),
            anomalies: Vec::new(),
            insights: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}
