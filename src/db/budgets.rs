//! Budget row operations
//!
//! `spent_cents` is derived state: only the ledger synchronizer writes it,
//! via `set_spent` inside the engine's mutation transactions.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Budget, Period};

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let period_str: String = row.get(2)?;
    Ok(Budget {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        // Stored periods are written from validated Period values
        period: period_str.parse().unwrap_or_else(|_| Period::from_date(chrono::Utc::now().date_naive())),
        limit_cents: row.get(3)?,
        spent_cents: row.get(4)?,
        notes: row.get(5)?,
    })
}

const SELECT_COLUMNS: &str = "id, owner_id, period, limit_cents, spent_cents, notes";

/// Fetch a budget for an owner+period inside the caller's transaction
pub(crate) fn get_for_period(
    conn: &Connection,
    owner_id: i64,
    period: &Period,
) -> Result<Option<Budget>> {
    let sql = format!(
        "SELECT {} FROM budgets WHERE owner_id = ? AND period = ?",
        SELECT_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![owner_id, period.as_str()], row_to_budget)
        .optional()?)
}

/// Overwrite a budget's derived spent amount (ledger synchronizer only)
pub(crate) fn set_spent(conn: &Connection, budget_id: i64, spent_cents: i64) -> Result<()> {
    conn.execute(
        "UPDATE budgets SET spent_cents = ? WHERE id = ?",
        params![spent_cents, budget_id],
    )?;
    Ok(())
}

/// SUM of the owner's expense amounts in the given period, inside the
/// caller's transaction
pub(crate) fn sum_expenses_for_period(
    conn: &Connection,
    owner_id: i64,
    period: &Period,
) -> Result<i64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE owner_id = ? AND occurred_on LIKE ?",
        params![owner_id, format!("{}-%", period.as_str())],
        |row| row.get(0),
    )?;
    Ok(total)
}

impl Database {
    /// Create a budget for an owner+period
    ///
    /// At most one budget may exist per (owner, period).
    pub fn create_budget(
        &self,
        owner_id: i64,
        period: &Period,
        limit_cents: i64,
        notes: Option<&str>,
    ) -> Result<Budget> {
        if limit_cents < 0 {
            return Err(Error::InvalidData(format!(
                "budget limit must be non-negative, got {} cents",
                limit_cents
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (owner_id, period, limit_cents, spent_cents, notes) VALUES (?, ?, ?, 0, ?)",
            params![owner_id, period.as_str(), limit_cents, notes],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::InvalidData(format!(
                    "budget for period {} already exists",
                    period.as_str()
                ))
            }
            other => Error::Database(other),
        })?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_budget(owner_id, period)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Fetch a budget for an owner+period, if one exists
    pub fn get_budget(&self, owner_id: i64, period: &Period) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        get_for_period(&conn, owner_id, period)
    }

    /// All budgets for an owner, most recent period first
    pub fn list_budgets(&self, owner_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM budgets WHERE owner_id = ? ORDER BY period DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], row_to_budget)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Update a budget's limit and/or notes (never its spent amount)
    pub fn update_budget(
        &self,
        owner_id: i64,
        period: &Period,
        limit_cents: Option<i64>,
        notes: Option<&str>,
    ) -> Result<Budget> {
        if let Some(limit) = limit_cents {
            if limit < 0 {
                return Err(Error::InvalidData(format!(
                    "budget limit must be non-negative, got {} cents",
                    limit
                )));
            }
            let conn = self.conn()?;
            conn.execute(
                "UPDATE budgets SET limit_cents = ? WHERE owner_id = ? AND period = ?",
                params![limit, owner_id, period.as_str()],
            )?;
        }
        if let Some(notes) = notes {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE budgets SET notes = ? WHERE owner_id = ? AND period = ?",
                params![notes, owner_id, period.as_str()],
            )?;
        }

        self.get_budget(owner_id, period)?
            .ok_or_else(|| Error::NotFound(format!("budget for period {}", period.as_str())))
    }

    /// Delete a budget (independent of its period's expenses)
    pub fn delete_budget(&self, owner_id: i64, period: &Period) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE owner_id = ? AND period = ?",
            params![owner_id, period.as_str()],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!(
                "budget for period {}",
                period.as_str()
            )));
        }
        Ok(())
    }
}
