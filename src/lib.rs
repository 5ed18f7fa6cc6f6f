//! Spendwise Core Library
//!
//! Embeddable engine for AI-assisted expense tracking:
//! - Fallback categorization cascade (manual, remote classifier, keywords)
//! - HTTP adapter for an external zero-shot classifier service
//! - SQLite persistence with derived budget ledger synchronization
//! - Capped savings-goal contributions
//! - Windowed spending analytics with anomaly detection and insights

pub mod analytics;
pub mod classify;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod goals;
pub mod ledger;
pub mod models;

/// Test utilities including the mock classifier HTTP server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    AiPerformance, AnalysisReport, Analyzer, Anomaly, CategorySlice, Insight, InsightKind,
    Priority, Recommendation,
};
pub use classify::{
    CategoryResolver, Classifier, ClassifierClient, ClassifierScore, MockClassifier,
    RemoteClassifier,
};
pub use config::{AnalyticsConfig, ClassifierConfig, EngineConfig};
pub use db::Database;
pub use engine::ExpenseEngine;
pub use error::{Error, Result};
pub use goals::{apply_contribution, ContributionOutcome};
pub use ledger::BudgetLedger;
pub use models::{
    Budget, BudgetView, CategorizationMethod, CategorizationResult, Category, Expense,
    ExpenseUpdate, Goal, NewExpense, Period,
};
