//! Budget ledger synchronizer
//!
//! Recomputes a budget's derived `spent_cents` whenever expenses in its
//! period change. Recomputation is always a full SUM over the period's
//! expenses rather than an incremental delta: correctness under arbitrary
//! historical edits (bulk import corrections, cross-month moves) is worth
//! the O(expenses-in-period) cost, which monthly transaction volume keeps
//! small.
//!
//! A period with no budget is a normal state: sync skips it and views
//! return None.

use rusqlite::Connection;
use tracing::debug;

use crate::db::{budgets, Database};
use crate::error::Result;
use crate::models::{BudgetView, Period};

/// Synchronizes budget spent amounts with the expense store
pub struct BudgetLedger<'a> {
    db: &'a Database,
}

impl<'a> BudgetLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Recompute spent amounts for the affected periods
    ///
    /// Standalone entry point; engine mutations instead call
    /// [`sync_in_tx`] inside their own transaction so the mutation and the
    /// recompute commit atomically.
    pub fn sync(&self, owner_id: i64, periods: &[Period]) -> Result<()> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        sync_in_tx(&tx, owner_id, periods)?;
        tx.commit()?;
        Ok(())
    }

    /// Budget read-model with derived remaining/utilization fields
    ///
    /// Returns None when no budget exists for the period.
    pub fn view(&self, owner_id: i64, period: &Period) -> Result<Option<BudgetView>> {
        Ok(self
            .db
            .get_budget(owner_id, period)?
            .map(|b| BudgetView::from_budget(&b)))
    }
}

/// Full recompute of each affected period's budget, inside the caller's
/// transaction. Periods without a budget are skipped.
pub(crate) fn sync_in_tx(conn: &Connection, owner_id: i64, periods: &[Period]) -> Result<()> {
    for period in periods {
        let Some(budget) = budgets::get_for_period(conn, owner_id, period)? else {
            debug!(owner_id, period = %period, "No budget for period, skipping sync");
            continue;
        };

        let spent = budgets::sum_expenses_for_period(conn, owner_id, period)?;
        budgets::set_spent(conn, budget.id, spent)?;
        debug!(owner_id, period = %period, spent_cents = spent, "Budget ledger synced");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::expenses;
    use crate::models::{CategorizationMethod, CategorizationResult, Category, NewExpense};
    use chrono::NaiveDate;

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn add_expense(db: &Database, owner_id: i64, amount_cents: i64, date: &str) -> i64 {
        let conn = db.conn().unwrap();
        expenses::insert(
            &conn,
            &NewExpense {
                owner_id,
                description: "test".to_string(),
                amount_cents,
                manual_category: None,
                occurred_on: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                notes: None,
            },
            &CategorizationResult {
                category: Category::Other,
                confidence: 0.1,
                method: CategorizationMethod::KeywordMatch,
                rationale: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_sync_recomputes_sum() {
        let db = Database::in_memory().unwrap();
        db.create_budget(1, &period("2026-01"), 10_000, None).unwrap();
        add_expense(&db, 1, 2_500, "2026-01-05");
        add_expense(&db, 1, 4_000, "2026-01-20");
        add_expense(&db, 1, 9_999, "2026-02-01"); // other period

        let ledger = BudgetLedger::new(&db);
        ledger.sync(1, &[period("2026-01")]).unwrap();

        let view = ledger.view(1, &period("2026-01")).unwrap().unwrap();
        assert_eq!(view.spent_cents, 6_500);
        assert_eq!(view.remaining_cents, 3_500);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.create_budget(1, &period("2026-01"), 10_000, None).unwrap();
        add_expense(&db, 1, 2_500, "2026-01-05");

        let ledger = BudgetLedger::new(&db);
        ledger.sync(1, &[period("2026-01")]).unwrap();
        let first = ledger.view(1, &period("2026-01")).unwrap().unwrap();
        ledger.sync(1, &[period("2026-01")]).unwrap();
        let second = ledger.view(1, &period("2026-01")).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_budget_is_noop() {
        let db = Database::in_memory().unwrap();
        add_expense(&db, 1, 2_500, "2026-01-05");

        let ledger = BudgetLedger::new(&db);
        // No budget exists; must not error
        ledger.sync(1, &[period("2026-01")]).unwrap();
        assert!(ledger.view(1, &period("2026-01")).unwrap().is_none());
    }

    #[test]
    fn test_over_limit_is_representable() {
        let db = Database::in_memory().unwrap();
        db.create_budget(1, &period("2026-01"), 10_000, None).unwrap();
        add_expense(&db, 1, 12_500, "2026-01-10");

        let ledger = BudgetLedger::new(&db);
        ledger.sync(1, &[period("2026-01")]).unwrap();

        let view = ledger.view(1, &period("2026-01")).unwrap().unwrap();
        assert_eq!(view.spent_cents, 12_500);
        assert_eq!(view.remaining_cents, -2_500);
        assert!((view.utilization - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_delete_then_sync_removes_exactly_that_amount() {
        let db = Database::in_memory().unwrap();
        db.create_budget(1, &period("2026-01"), 10_000, None).unwrap();
        let keep = add_expense(&db, 1, 2_500, "2026-01-05");
        let dropped = add_expense(&db, 1, 4_000, "2026-01-20");
        let _ = keep;

        let ledger = BudgetLedger::new(&db);
        ledger.sync(1, &[period("2026-01")]).unwrap();
        assert_eq!(
            ledger.view(1, &period("2026-01")).unwrap().unwrap().spent_cents,
            6_500
        );

        {
            let conn = db.conn().unwrap();
            expenses::delete(&conn, dropped, 1).unwrap();
        }
        ledger.sync(1, &[period("2026-01")]).unwrap();
        assert_eq!(
            ledger.view(1, &period("2026-01")).unwrap().unwrap().spent_cents,
            2_500
        );
    }

    #[test]
    fn test_owners_are_independent() {
        let db = Database::in_memory().unwrap();
        db.create_budget(1, &period("2026-01"), 10_000, None).unwrap();
        db.create_budget(2, &period("2026-01"), 10_000, None).unwrap();
        add_expense(&db, 1, 2_500, "2026-01-05");
        add_expense(&db, 2, 7_000, "2026-01-05");

        let ledger = BudgetLedger::new(&db);
        ledger.sync(1, &[period("2026-01")]).unwrap();
        ledger.sync(2, &[period("2026-01")]).unwrap();

        assert_eq!(
            ledger.view(1, &period("2026-01")).unwrap().unwrap().spent_cents,
            2_500
        );
        assert_eq!(
            ledger.view(2, &period("2026-01")).unwrap().unwrap().spent_cents,
            7_000
        );
    }
}
