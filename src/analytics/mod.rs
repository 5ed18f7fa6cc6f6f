//! Analytics & insight generation
//!
//! On-demand summaries over a lookback window of persisted expenses:
//! category breakdown, categorization-quality stats, anomaly flags, and
//! natural-language insights with paired recommendations. Pure over its
//! inputs: identical expenses and window always produce identical output.

mod engine;
mod types;

pub use engine::Analyzer;
pub use types::{
    AiPerformance, AnalysisReport, Anomaly, CategorySlice, Insight, InsightKind, Priority,
    Recommendation,
};
