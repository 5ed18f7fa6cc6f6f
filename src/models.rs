//! Domain models for Spendwise
//!
//! Monetary amounts are fixed-point integer cents (`i64`). Ratios such as
//! confidence and utilization are `f64`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Expense categories the engine can assign
///
/// The set is closed: every expense resolves to one of these, with `Other`
/// as the guaranteed floor. Declaration order matters: it is the tie-break
/// order for the keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FoodDining,
    Transportation,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    Housing,
    Other,
}

impl Category {
    /// Display label, as shown in the UI and used as oracle candidate labels
    pub fn label(&self) -> &'static str {
        match self {
            Self::FoodDining => "Food & Dining",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Healthcare => "Healthcare",
            Self::Housing => "Housing",
            Self::Other => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodDining => "food_dining",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Housing => "housing",
            Self::Other => "other",
        }
    }

    /// All categories, in declaration (tie-break) order
    pub fn all() -> &'static [Category] {
        &[
            Self::FoodDining,
            Self::Transportation,
            Self::Entertainment,
            Self::Shopping,
            Self::Utilities,
            Self::Healthcare,
            Self::Housing,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food_dining" | "food & dining" | "food and dining" => Ok(Self::FoodDining),
            "transportation" => Ok(Self::Transportation),
            "entertainment" => Ok(Self::Entertainment),
            "shopping" => Ok(Self::Shopping),
            "utilities" => Ok(Self::Utilities),
            "healthcare" => Ok(Self::Healthcare),
            "housing" => Ok(Self::Housing),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How an expense's category was assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizationMethod {
    /// Accepted result from the remote classification oracle
    ExternalClassifier,
    /// Keyword-table match, or the floor fallback
    KeywordMatch,
    /// User-supplied category
    Manual,
}

impl CategorizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalClassifier => "external_classifier",
            Self::KeywordMatch => "keyword_match",
            Self::Manual => "manual",
        }
    }
}

impl std::str::FromStr for CategorizationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "external_classifier" => Ok(Self::ExternalClassifier),
            "keyword_match" => Ok(Self::KeywordMatch),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("Unknown categorization method: {}", s)),
        }
    }
}

impl std::fmt::Display for CategorizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar-month budget bucket, stored as a validated `YYYY-MM` string
///
/// Period is always derived from an expense's own occurrence date; there is
/// no ambient "current period" anywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    /// The period an occurrence date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let valid = s.len() == 7
            && s.as_bytes()[4] == b'-'
            && s[..4].chars().all(|c| c.is_ascii_digit())
            && s[5..].parse::<u32>().map_or(false, |m| (1..=12).contains(&m));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("Invalid period (expected YYYY-MM): {}", s))
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted expense with its categorization metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub owner_id: i64,
    pub description: String,
    /// Fixed-point amount in cents; never negative
    pub amount_cents: i64,
    pub category: Category,
    /// Resolver confidence in [0, 1]
    pub confidence: f64,
    pub method: CategorizationMethod,
    /// True when the category came from the user; blocks re-resolution on edit
    pub manual_override: bool,
    pub occurred_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// The budget period this expense counts against
    pub fn period(&self) -> Period {
        Period::from_date(self.occurred_on)
    }
}

/// Input for creating an expense (before categorization)
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub owner_id: i64,
    pub description: String,
    pub amount_cents: i64,
    /// User-supplied category; skips the classifier cascade entirely
    pub manual_category: Option<Category>,
    pub occurred_on: NaiveDate,
    pub notes: Option<String>,
}

/// Partial update to an expense; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    /// Setting this marks the expense as manually categorized
    pub manual_category: Option<Category>,
    pub occurred_on: Option<NaiveDate>,
    /// `Some(None)` clears the notes; the outer `None` leaves them unchanged
    pub notes: Option<Option<String>>,
}

/// A monthly budget. `spent_cents` is derived state owned by the ledger
/// synchronizer; callers never write it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub owner_id: i64,
    pub period: Period,
    pub limit_cents: i64,
    pub spent_cents: i64,
    pub notes: Option<String>,
}

/// Read-model over a budget with its derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetView {
    pub period: Period,
    pub limit_cents: i64,
    pub spent_cents: i64,
    /// May be negative; over-limit is a displayed state, not an error
    pub remaining_cents: i64,
    /// spent / limit; 0.0 when the limit is 0; may exceed 1.0
    pub utilization: f64,
}

impl BudgetView {
    pub fn from_budget(budget: &Budget) -> Self {
        let utilization = if budget.limit_cents == 0 {
            0.0
        } else {
            budget.spent_cents as f64 / budget.limit_cents as f64
        };
        Self {
            period: budget.period.clone(),
            limit_cents: budget.limit_cents,
            spent_cents: budget.spent_cents,
            remaining_cents: budget.limit_cents - budget.spent_cents,
            utilization,
        }
    }
}

/// A savings goal. `current_cents` advances only through the contribution
/// capper; it is capped at contribution time, not at target-edit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub target_cents: i64,
    pub current_cents: i64,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Result of resolving a category for an expense description
///
/// Transient: produced by the resolver, embedded into the expense row at
/// persistence time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub category: Category,
    pub confidence: f64,
    pub method: CategorizationMethod,
    /// Free-text explanation (e.g. which keyword matched)
    pub rationale: Option<String>,
}
