//! Expense row operations

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    CategorizationMethod, CategorizationResult, Category, Expense, NewExpense, Period,
};

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let category_str: String = row.get(4)?;
    let method_str: String = row.get(6)?;
    let occurred_on_str: String = row.get(8)?;
    let created_at_str: String = row.get(10)?;

    Ok(Expense {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        description: row.get(2)?,
        amount_cents: row.get(3)?,
        category: Category::from_str(&category_str).unwrap_or(Category::Other),
        confidence: row.get(5)?,
        method: CategorizationMethod::from_str(&method_str)
            .unwrap_or(CategorizationMethod::Manual),
        manual_override: row.get(7)?,
        occurred_on: NaiveDate::parse_from_str(&occurred_on_str, "%Y-%m-%d")
            .unwrap_or_default(),
        notes: row.get(9)?,
        created_at: parse_datetime(&created_at_str),
    })
}

const SELECT_COLUMNS: &str = "id, owner_id, description, amount_cents, category, confidence, \
                              method, manual_override, occurred_on, notes, created_at";

/// Insert an expense row inside the caller's transaction
pub(crate) fn insert(
    conn: &Connection,
    new: &NewExpense,
    cat: &CategorizationResult,
) -> Result<i64> {
    if new.amount_cents < 0 {
        return Err(Error::InvalidData(format!(
            "expense amount must be non-negative, got {} cents",
            new.amount_cents
        )));
    }

    conn.execute(
        r#"
        INSERT INTO expenses (owner_id, description, amount_cents, category, confidence, method, manual_override, occurred_on, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            new.owner_id,
            new.description,
            new.amount_cents,
            cat.category.as_str(),
            cat.confidence,
            cat.method.as_str(),
            cat.method == CategorizationMethod::Manual,
            new.occurred_on.to_string(),
            new.notes,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Rewrite an expense row inside the caller's transaction
pub(crate) fn update(conn: &Connection, expense: &Expense) -> Result<()> {
    if expense.amount_cents < 0 {
        return Err(Error::InvalidData(format!(
            "expense amount must be non-negative, got {} cents",
            expense.amount_cents
        )));
    }

    let updated = conn.execute(
        r#"
        UPDATE expenses
        SET description = ?, amount_cents = ?, category = ?, confidence = ?,
            method = ?, manual_override = ?, occurred_on = ?, notes = ?
        WHERE id = ? AND owner_id = ?
        "#,
        params![
            expense.description,
            expense.amount_cents,
            expense.category.as_str(),
            expense.confidence,
            expense.method.as_str(),
            expense.manual_override,
            expense.occurred_on.to_string(),
            expense.notes,
            expense.id,
            expense.owner_id,
        ],
    )?;

    if updated == 0 {
        return Err(Error::NotFound(format!("expense {}", expense.id)));
    }
    Ok(())
}

/// Delete an expense row inside the caller's transaction
pub(crate) fn delete(conn: &Connection, id: i64, owner_id: i64) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM expenses WHERE id = ? AND owner_id = ?",
        params![id, owner_id],
    )?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("expense {}", id)));
    }
    Ok(())
}

/// Fetch one expense by id inside the caller's transaction
pub(crate) fn get(conn: &Connection, id: i64, owner_id: i64) -> Result<Expense> {
    let sql = format!(
        "SELECT {} FROM expenses WHERE id = ? AND owner_id = ?",
        SELECT_COLUMNS
    );
    conn.query_row(&sql, params![id, owner_id], row_to_expense)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("expense {}", id)))
}

impl Database {
    /// Fetch one expense by id
    pub fn get_expense(&self, id: i64, owner_id: i64) -> Result<Expense> {
        let conn = self.conn()?;
        get(&conn, id, owner_id)
    }

    /// All of an owner's expenses in a budget period (YYYY-MM prefix match
    /// on the occurrence date), oldest first
    pub fn list_expenses_for_period(&self, owner_id: i64, period: &Period) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses WHERE owner_id = ? AND occurred_on LIKE ? ORDER BY occurred_on, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![owner_id, format!("{}-%", period.as_str())],
            row_to_expense,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All of an owner's expenses with occurrence dates in [from, to], oldest first
    pub fn list_expenses_between(
        &self,
        owner_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses WHERE owner_id = ? AND occurred_on BETWEEN ? AND ? ORDER BY occurred_on, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![owner_id, from.to_string(), to.to_string()],
            row_to_expense,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
