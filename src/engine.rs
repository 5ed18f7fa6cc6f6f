//! The engine facade: categorized expense mutations with budget ledger
//! consistency, plus entry points for goals and analytics.
//!
//! Every expense mutation and its budget recomputation run inside a single
//! SQLite transaction, so `spent_cents` can never drift from the expense
//! rows it summarizes.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::analytics::{AnalysisReport, Analyzer};
use crate::classify::{CategoryResolver, ClassifierClient};
use crate::config::EngineConfig;
use crate::db::{budgets, expenses, Database};
use crate::error::Result;
use crate::goals::{self, ContributionOutcome};
use crate::ledger::{self, BudgetLedger};
use crate::models::{
    BudgetView, CategorizationMethod, CategorizationResult, Category, Expense, ExpenseUpdate,
    NewExpense, Period,
};

pub struct ExpenseEngine {
    db: Database,
    resolver: CategoryResolver,
    analyzer: Analyzer,
}

impl ExpenseEngine {
    pub fn new(db: Database, client: Option<ClassifierClient>, config: EngineConfig) -> Self {
        let resolver = CategoryResolver::new(client, config.classifier.clone());
        let analyzer = Analyzer::new(config);
        Self {
            db,
            resolver,
            analyzer,
        }
    }

    /// Engine with the classifier endpoint (if any) taken from the
    /// environment and the given policy config
    pub fn from_env(db: Database, config: EngineConfig) -> Self {
        let client = ClassifierClient::from_env(config.classifier.timeout_secs);
        Self::new(db, client, config)
    }

    /// Keyword-only engine; the cascade runs without its oracle tier
    pub fn offline(db: Database) -> Self {
        Self::new(db, None, EngineConfig::default())
    }

    /// Direct store access for budget and goal CRUD
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Categorize, persist, and bring the affected budget up to date
    pub async fn create_expense(&self, new: NewExpense) -> Result<Expense> {
        let cat = self
            .resolver
            .resolve(&new.description, new.amount_cents, new.manual_category)
            .await;

        let period = Period::from_date(new.occurred_on);
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        let id = expenses::insert(&tx, &new, &cat)?;
        ledger::sync_in_tx(&tx, new.owner_id, &[period])?;
        tx.commit()?;

        info!(
            id,
            owner_id = new.owner_id,
            category = cat.category.as_str(),
            method = cat.method.as_str(),
            "Created expense"
        );
        self.db.get_expense(id, new.owner_id)
    }

    /// Apply a partial update, re-resolving the category when warranted
    ///
    /// A supplied category always wins and marks the expense as manually
    /// categorized. Otherwise a changed description or amount triggers
    /// re-resolution unless a manual override is in place. Both the old and new periods
    /// are resynced when the occurrence date moves across months.
    pub async fn update_expense(
        &self,
        id: i64,
        owner_id: i64,
        update: ExpenseUpdate,
    ) -> Result<Expense> {
        let mut expense = self.db.get_expense(id, owner_id)?;
        let old_period = expense.period();

        let description_changed = match &update.description {
            Some(d) => *d != expense.description,
            None => false,
        };
        let amount_changed = match update.amount_cents {
            Some(a) => a != expense.amount_cents,
            None => false,
        };
        if let Some(description) = update.description {
            expense.description = description;
        }
        if let Some(amount_cents) = update.amount_cents {
            expense.amount_cents = amount_cents;
        }
        if let Some(occurred_on) = update.occurred_on {
            expense.occurred_on = occurred_on;
        }
        if let Some(notes) = update.notes {
            expense.notes = notes;
        }

        if let Some(category) = update.manual_category {
            expense.category = category;
            expense.confidence = 1.0;
            expense.method = CategorizationMethod::Manual;
            expense.manual_override = true;
        } else if (description_changed || amount_changed) && !expense.manual_override {
            let cat = self
                .resolver
                .resolve(&expense.description, expense.amount_cents, None)
                .await;
            expense.category = cat.category;
            expense.confidence = cat.confidence;
            expense.method = cat.method;
        }

        let new_period = expense.period();
        let periods: Vec<Period> = if new_period == old_period {
            vec![new_period]
        } else {
            vec![old_period, new_period]
        };

        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        expenses::update(&tx, &expense)?;
        ledger::sync_in_tx(&tx, owner_id, &periods)?;
        tx.commit()?;

        info!(id, owner_id, "Updated expense");
        self.db.get_expense(id, owner_id)
    }

    /// Delete an expense and release its amount back to the period budget
    pub fn delete_expense(&self, id: i64, owner_id: i64) -> Result<()> {
        let expense = self.db.get_expense(id, owner_id)?;
        let period = expense.period();

        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        expenses::delete(&tx, id, owner_id)?;
        ledger::sync_in_tx(&tx, owner_id, &[period])?;
        tx.commit()?;

        info!(id, owner_id, "Deleted expense");
        Ok(())
    }

    /// Resolve a category without persisting anything
    pub async fn resolve_category(
        &self,
        description: &str,
        amount_cents: i64,
        manual_category: Option<Category>,
    ) -> CategorizationResult {
        self.resolver
            .resolve(description, amount_cents, manual_category)
            .await
    }

    /// Resolve many descriptions, preserving input order
    pub async fn resolve_category_batch(
        &self,
        descriptions: &[String],
    ) -> Vec<CategorizationResult> {
        self.resolver.resolve_batch(descriptions).await
    }

    /// Force a recompute of the affected periods' budgets from their
    /// expense rows
    pub fn sync_budget(&self, owner_id: i64, periods: &[Period]) -> Result<()> {
        BudgetLedger::new(&self.db).sync(owner_id, periods)
    }

    /// The budget read-model for a period, if a budget exists
    pub fn get_budget_view(&self, owner_id: i64, period: &Period) -> Result<Option<BudgetView>> {
        BudgetLedger::new(&self.db).view(owner_id, period)
    }

    /// Apply a capped contribution to a savings goal
    pub fn contribute_goal(
        &self,
        goal_id: i64,
        owner_id: i64,
        amount_cents: i64,
    ) -> Result<ContributionOutcome> {
        goals::contribute(&self.db, goal_id, owner_id, amount_cents)
    }

    /// Spending analysis over the window ending today
    pub fn analyze(&self, owner_id: i64, window_days: u32) -> Result<AnalysisReport> {
        self.analyze_as_of(owner_id, window_days, Utc::now().date_naive())
    }

    /// Spending analysis with an explicit as-of date (deterministic)
    pub fn analyze_as_of(
        &self,
        owner_id: i64,
        window_days: u32,
        as_of: NaiveDate,
    ) -> Result<AnalysisReport> {
        self.analyzer.analyze(&self.db, owner_id, window_days, as_of)
    }

    /// True when a period's stored spent amount matches the live sum of
    /// its expenses
    pub fn budget_consistent(&self, owner_id: i64, period: &Period) -> Result<bool> {
        let Some(budget) = self.db.get_budget(owner_id, period)? else {
            return Ok(true);
        };
        let conn = self.db.conn()?;
        let actual = budgets::sum_expenses_for_period(&conn, owner_id, period)?;
        Ok(budget.spent_cents == actual)
    }
}
