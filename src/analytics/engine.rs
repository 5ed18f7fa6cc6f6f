//! The analytics & insight generator

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{CategorizationMethod, Category, Expense};

use super::types::{
    AiPerformance, AnalysisReport, Anomaly, CategorySlice, Insight, InsightKind, Priority,
    Recommendation,
};

/// Most anomalies reported per window, largest first
const MAX_ANOMALIES: usize = 5;

/// Expense count above which the ai-efficiency insight may fire
const AI_EFFICIENCY_MIN_EXPENSES: usize = 10;

/// Share of expenses that must resolve at the oracle tier for the
/// ai-efficiency insight
const AI_EFFICIENCY_SHARE: f64 = 0.7;

/// "Small expense" cutoff for the micro-spending recommendation ($10)
const MICRO_EXPENSE_CENTS: i64 = 1_000;

fn dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Computes spending reports over a lookback window
pub struct Analyzer {
    config: EngineConfig,
}

impl Analyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Analyze an owner's expenses over the `window_days` ending at `as_of`
    ///
    /// The as-of date is an explicit parameter so identical store contents
    /// always yield identical reports.
    pub fn analyze(
        &self,
        db: &Database,
        owner_id: i64,
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<AnalysisReport> {
        let from = as_of - Duration::days(window_days as i64);
        let expenses = db.list_expenses_between(owner_id, from, as_of)?;
        debug!(
            owner_id,
            window_days,
            expense_count = expenses.len(),
            "Running spending analysis"
        );
        Ok(self.report(&expenses, window_days))
    }

    /// Build the report from an already-loaded expense set (pure)
    pub fn report(&self, expenses: &[Expense], window_days: u32) -> AnalysisReport {
        if expenses.is_empty() {
            return AnalysisReport::empty(window_days);
        }

        let total_cents: i64 = expenses.iter().map(|e| e.amount_cents).sum();
        let breakdown = breakdown(expenses, total_cents);
        let ai_performance = ai_performance(expenses);
        let anomalies = self.detect_anomalies(expenses);
        let (insights, recommendations) =
            self.generate_insights(expenses, &breakdown, &ai_performance, total_cents, window_days);

        AnalysisReport {
            window_days,
            expense_count: expenses.len(),
            total_cents,
            breakdown,
            ai_performance,
            anomalies,
            insights,
            recommendations,
        }
    }

    /// Flag expenses whose amount is statistically unusual for their category
    ///
    /// Each expense is tested against mean + sigma·stddev of the *other*
    /// expenses in its category within the window (leave-one-out, so a
    /// single large outlier cannot inflate the deviation enough to hide
    /// itself). Categories below the minimum sample size are skipped
    /// entirely; sparse data is never flagged.
    fn detect_anomalies(&self, expenses: &[Expense]) -> Vec<Anomaly> {
        let min_samples = self.config.analytics.anomaly_min_samples;
        let sigma = self.config.analytics.anomaly_sigma;

        let mut by_category: HashMap<Category, Vec<&Expense>> = HashMap::new();
        for expense in expenses {
            by_category.entry(expense.category).or_default().push(expense);
        }

        let mut anomalies = Vec::new();
        for group in by_category.values() {
            if group.len() < min_samples {
                // Insufficient sample: silently skip, never flag
                continue;
            }

            for candidate in group {
                let others: Vec<f64> = group
                    .iter()
                    .filter(|e| e.id != candidate.id)
                    .map(|e| e.amount_cents as f64)
                    .collect();
                if others.len() < 2 {
                    continue;
                }

                let mean = others.iter().sum::<f64>() / others.len() as f64;
                let variance = others
                    .iter()
                    .map(|a| (a - mean).powi(2))
                    .sum::<f64>()
                    / (others.len() - 1) as f64;
                let threshold = mean + sigma * variance.sqrt();

                if candidate.amount_cents as f64 > threshold {
                    anomalies.push(Anomaly {
                        expense_id: candidate.id,
                        description: candidate.description.clone(),
                        category: candidate.category,
                        amount_cents: candidate.amount_cents,
                        category_mean_cents: mean,
                        threshold_cents: threshold,
                    });
                }
            }
        }

        // Largest overshoot first; id tie-break keeps the order stable
        anomalies.sort_by(|a, b| {
            b.amount_cents
                .cmp(&a.amount_cents)
                .then(a.expense_id.cmp(&b.expense_id))
        });
        anomalies.truncate(MAX_ANOMALIES);
        anomalies
    }

    /// Generate insight statements and their paired recommendations
    fn generate_insights(
        &self,
        expenses: &[Expense],
        breakdown: &[CategorySlice],
        ai_performance: &AiPerformance,
        total_cents: i64,
        window_days: u32,
    ) -> (Vec<Insight>, Vec<Recommendation>) {
        let mut insights = Vec::new();
        let mut recommendations = Vec::new();
        let concentration_pct = self.config.analytics.concentration_threshold * 100.0;

        // High concentration: any category at or above the materiality
        // threshold, paired with a savings recommendation
        for slice in breakdown {
            if slice.percentage < concentration_pct {
                continue;
            }
            let label = slice.category.label();
            insights.push(Insight {
                kind: InsightKind::HighConcentration,
                title: format!("High spending in {}", label),
                content: format!(
                    "{} accounts for {:.1}% of your spending (${:.2})",
                    label,
                    slice.percentage,
                    dollars(slice.total_cents)
                ),
                confidence: 0.9,
                priority: Priority::Medium,
                action_items: vec![
                    format!("Review {} expenses for optimization", label),
                    "Set a category-specific budget".to_string(),
                ],
            });

            let rate = self.config.savings_rate(slice.category);
            let savings = (slice.total_cents as f64 * rate).round() as i64;
            let suggestion = match slice.category {
                Category::FoodDining => "Plan meals weekly and cook at home more often",
                Category::Entertainment => "Audit subscriptions and keep only what you use",
                Category::Shopping => "Batch purchases and use a 48-hour wishlist rule",
                _ => "Look for cheaper alternatives or bulk pricing",
            };
            recommendations.push(Recommendation {
                title: format!("Trim {} spending", label),
                content: format!(
                    "{}. Cutting {:.0}% would save about ${:.2} over this window.",
                    suggestion,
                    rate * 100.0,
                    dollars(savings)
                ),
                priority: Priority::Medium,
                estimated_savings_cents: Some(savings),
                actions: vec![suggestion.to_string()],
            });
        }

        // Spending velocity: daily average running above the policy line
        let daily_avg_cents = total_cents / window_days.max(1) as i64;
        if daily_avg_cents > self.config.analytics.velocity_daily_cents {
            insights.push(Insight {
                kind: InsightKind::SpendingVelocity,
                title: "High daily spending detected".to_string(),
                content: format!(
                    "You're averaging ${:.2} per day over the last {} days",
                    dollars(daily_avg_cents),
                    window_days
                ),
                confidence: 0.85,
                priority: Priority::High,
                action_items: vec![
                    "Set a daily spending limit".to_string(),
                    "Track discretionary purchases".to_string(),
                ],
            });
            recommendations.push(Recommendation {
                title: "Set a daily budget".to_string(),
                content: format!(
                    "A daily cap below ${:.2} would bring this window back in line",
                    dollars(self.config.analytics.velocity_daily_cents)
                ),
                priority: Priority::High,
                estimated_savings_cents: None,
                actions: vec!["Set a daily spending limit".to_string()],
            });
        }

        // AI efficiency: informational, no paired recommendation
        if expenses.len() > AI_EFFICIENCY_MIN_EXPENSES {
            let share = ai_performance.external_count as f64 / expenses.len() as f64;
            if share >= AI_EFFICIENCY_SHARE {
                insights.push(Insight {
                    kind: InsightKind::AiEfficiency,
                    title: "Automatic categorization working well".to_string(),
                    content: format!(
                        "{:.1}% of expenses were categorized by the classifier",
                        share * 100.0
                    ),
                    confidence: 0.95,
                    priority: Priority::Low,
                    action_items: vec![
                        "Keep using descriptive expense names".to_string(),
                        "Spot-check assigned categories occasionally".to_string(),
                    ],
                });
            }
        }

        // Micro-spending: many small purchases adding up
        let small: Vec<&Expense> = expenses
            .iter()
            .filter(|e| e.amount_cents < MICRO_EXPENSE_CENTS)
            .collect();
        if small.len() as f64 > expenses.len() as f64 * 0.6 {
            let small_total: i64 = small.iter().map(|e| e.amount_cents).sum();
            recommendations.push(Recommendation {
                title: "Small expenses add up".to_string(),
                content: format!(
                    "Purchases under $10 total ${:.2} this window",
                    dollars(small_total)
                ),
                priority: Priority::Low,
                estimated_savings_cents: Some((small_total as f64 * 0.2).round() as i64),
                actions: vec!["Set a weekly limit for small discretionary purchases".to_string()],
            });
        }

        (insights, recommendations)
    }
}

/// Per-category totals and percentages, largest first (ties break toward
/// category declaration order, keeping output deterministic)
fn breakdown(expenses: &[Expense], total_cents: i64) -> Vec<CategorySlice> {
    let mut by_category: HashMap<Category, (i64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = by_category.entry(expense.category).or_insert((0, 0));
        entry.0 += expense.amount_cents;
        entry.1 += 1;
    }

    let mut slices: Vec<CategorySlice> = Category::all()
        .iter()
        .filter_map(|category| {
            by_category.get(category).map(|(total, count)| CategorySlice {
                category: *category,
                total_cents: *total,
                expense_count: *count,
                percentage: if total_cents > 0 {
                    *total as f64 / total_cents as f64 * 100.0
                } else {
                    0.0
                },
            })
        })
        .collect();

    // Stable sort preserves declaration order among equal totals
    slices.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    slices
}

fn ai_performance(expenses: &[Expense]) -> AiPerformance {
    let mut perf = AiPerformance::default();
    let mut confidence_sum = 0.0;
    let mut confidence_count = 0usize;

    for expense in expenses {
        match expense.method {
            CategorizationMethod::ExternalClassifier => perf.external_count += 1,
            CategorizationMethod::KeywordMatch => perf.keyword_count += 1,
            CategorizationMethod::Manual => perf.manual_count += 1,
        }
        if expense.confidence > 0.0 {
            confidence_sum += expense.confidence;
            confidence_count += 1;
        }
        if expense.confidence > 0.8 {
            perf.high_confidence_count += 1;
        }
    }

    if confidence_count > 0 {
        perf.average_confidence = confidence_sum / confidence_count as f64;
    }
    perf
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(
        id: i64,
        description: &str,
        amount_cents: i64,
        category: Category,
        method: CategorizationMethod,
        confidence: f64,
    ) -> Expense {
        Expense {
            id,
            owner_id: 1,
            description: description.to_string(),
            amount_cents,
            category,
            confidence,
            method,
            manual_override: method == CategorizationMethod::Manual,
            occurred_on: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn keyword(id: i64, description: &str, amount_cents: i64, category: Category) -> Expense {
        expense(
            id,
            description,
            amount_cents,
            category,
            CategorizationMethod::KeywordMatch,
            0.6,
        )
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(EngineConfig::default())
    }

    #[test]
    fn test_empty_window_yields_empty_report() {
        let report = analyzer().report(&[], 30);
        assert_eq!(report.expense_count, 0);
        assert!(report.breakdown.is_empty());
        assert!(report.insights.is_empty());
        assert!(report.anomalies.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_breakdown_totals_and_percentages() {
        let expenses = vec![
            keyword(1, "groceries", 6_000, Category::FoodDining),
            keyword(2, "dinner", 4_000, Category::FoodDining),
            keyword(3, "gas", 10_000, Category::Transportation),
        ];
        let report = analyzer().report(&expenses, 30);

        assert_eq!(report.total_cents, 20_000);
        assert_eq!(report.breakdown.len(), 2);
        // Largest first
        assert_eq!(report.breakdown[0].category, Category::Transportation);
        assert!((report.breakdown[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(report.breakdown[1].expense_count, 2);
    }

    #[test]
    fn test_ai_performance_counts_and_average() {
        let expenses = vec![
            expense(1, "a", 100, Category::Other, CategorizationMethod::ExternalClassifier, 0.9),
            expense(2, "b", 100, Category::Other, CategorizationMethod::KeywordMatch, 0.6),
            expense(3, "c", 100, Category::Other, CategorizationMethod::Manual, 1.0),
        ];
        let report = analyzer().report(&expenses, 30);

        let perf = &report.ai_performance;
        assert_eq!(perf.external_count, 1);
        assert_eq!(perf.keyword_count, 1);
        assert_eq!(perf.manual_count, 1);
        assert!((perf.average_confidence - (0.9 + 0.6 + 1.0) / 3.0).abs() < 1e-9);
        assert_eq!(perf.high_confidence_count, 2);
    }

    #[test]
    fn test_anomaly_flags_outlier_only() {
        // Food & Dining: 10.00, 12.00, 200.00; only the 200 is anomalous
        let expenses = vec![
            keyword(1, "lunch", 1_000, Category::FoodDining),
            keyword(2, "lunch again", 1_200, Category::FoodDining),
            keyword(3, "omakase", 20_000, Category::FoodDining),
        ];
        let report = analyzer().report(&expenses, 30);

        assert_eq!(report.anomalies.len(), 1);
        let anomaly = &report.anomalies[0];
        assert_eq!(anomaly.expense_id, 3);
        assert_eq!(anomaly.category, Category::FoodDining);
        assert!(anomaly.amount_cents as f64 > anomaly.threshold_cents);
    }

    #[test]
    fn test_sparse_categories_never_flagged() {
        // Two wildly different amounts, but below the minimum sample size
        let expenses = vec![
            keyword(1, "copay", 500, Category::Healthcare),
            keyword(2, "surgery", 500_000, Category::Healthcare),
        ];
        let report = analyzer().report(&expenses, 30);
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_concentration_insight_and_paired_recommendation() {
        // $67 of $150 in one category (44.7%) crosses the 35% threshold
        let expenses = vec![
            keyword(1, "groceries", 6_700, Category::FoodDining),
            keyword(2, "gas", 4_000, Category::Transportation),
            keyword(3, "movie", 4_300, Category::Entertainment),
        ];
        let report = analyzer().report(&expenses, 30);

        let insight = report
            .insights
            .iter()
            .find(|i| i.kind == InsightKind::HighConcentration)
            .expect("expected a high-concentration insight");
        assert!(insight.content.contains("Food & Dining"));
        assert!(insight.content.contains("44.7%"));

        let rec = report
            .recommendations
            .iter()
            .find(|r| r.title.contains("Food & Dining"))
            .expect("expected a paired recommendation");
        // Dining savings heuristic: 15% of the category total
        assert_eq!(rec.estimated_savings_cents, Some(1_005));
    }

    #[test]
    fn test_no_concentration_insight_below_threshold() {
        let expenses = vec![
            keyword(1, "groceries", 3_000, Category::FoodDining),
            keyword(2, "gas", 3_500, Category::Transportation),
            keyword(3, "movie", 3_500, Category::Entertainment),
        ];
        let report = analyzer().report(&expenses, 30);
        assert!(report
            .insights
            .iter()
            .all(|i| i.kind != InsightKind::HighConcentration));
    }

    #[test]
    fn test_velocity_insight() {
        // $90/day over 30 days
        let expenses = vec![keyword(1, "rent", 270_000, Category::Housing)];
        let report = analyzer().report(&expenses, 30);
        assert!(report
            .insights
            .iter()
            .any(|i| i.kind == InsightKind::SpendingVelocity));
    }

    #[test]
    fn test_ai_efficiency_insight() {
        let mut expenses: Vec<Expense> = (0..11)
            .map(|i| {
                expense(
                    i,
                    "auto",
                    100,
                    Category::Other,
                    CategorizationMethod::ExternalClassifier,
                    0.9,
                )
            })
            .collect();
        expenses.push(expense(
            11,
            "manual",
            100,
            Category::Other,
            CategorizationMethod::Manual,
            1.0,
        ));
        let report = analyzer().report(&expenses, 30);
        assert!(report
            .insights
            .iter()
            .any(|i| i.kind == InsightKind::AiEfficiency));
    }

    #[test]
    fn test_determinism() {
        let expenses = vec![
            keyword(1, "groceries", 6_700, Category::FoodDining),
            keyword(2, "gas", 4_000, Category::Transportation),
            keyword(3, "lunch", 1_000, Category::FoodDining),
            keyword(4, "dinner", 1_200, Category::FoodDining),
        ];
        let a = analyzer().report(&expenses, 30);
        let b = analyzer().report(&expenses, 30);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
