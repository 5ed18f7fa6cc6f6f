//! Savings goal operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Goal;

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let target_date_str: Option<String> = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    Ok(Goal {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        target_cents: row.get(3)?,
        current_cents: row.get(4)?,
        target_date: target_date_str
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        created_at: parse_datetime(&created_at_str),
    })
}

const SELECT_COLUMNS: &str = "id, owner_id, name, target_cents, current_cents, target_date, created_at";

/// Overwrite a goal's current amount inside the caller's transaction
pub(crate) fn set_current(conn: &Connection, goal_id: i64, current_cents: i64) -> Result<()> {
    conn.execute(
        "UPDATE goals SET current_cents = ? WHERE id = ?",
        params![current_cents, goal_id],
    )?;
    Ok(())
}

impl Database {
    /// Create a savings goal with zero progress
    pub fn create_goal(
        &self,
        owner_id: i64,
        name: &str,
        target_cents: i64,
        target_date: Option<NaiveDate>,
    ) -> Result<Goal> {
        if target_cents <= 0 {
            return Err(Error::InvalidData(format!(
                "goal target must be positive, got {} cents",
                target_cents
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO goals (owner_id, name, target_cents, current_cents, target_date) VALUES (?, ?, ?, 0, ?)",
            params![owner_id, name, target_cents, target_date.map(|d| d.to_string())],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_goal(id, owner_id)
    }

    /// Fetch one goal by id
    pub fn get_goal(&self, id: i64, owner_id: i64) -> Result<Goal> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM goals WHERE id = ? AND owner_id = ?",
            SELECT_COLUMNS
        );
        conn.query_row(&sql, params![id, owner_id], row_to_goal)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("goal {}", id)))
    }

    /// All goals for an owner, newest first
    pub fn list_goals(&self, owner_id: i64) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM goals WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], row_to_goal)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Edit goal fields. Lowering the target below the current amount does
    /// NOT clamp the current amount; the cap applies at contribution time
    /// only. Intentional, see DESIGN.md.
    pub fn update_goal(
        &self,
        id: i64,
        owner_id: i64,
        name: Option<&str>,
        target_cents: Option<i64>,
        target_date: Option<NaiveDate>,
    ) -> Result<Goal> {
        if let Some(target) = target_cents {
            if target <= 0 {
                return Err(Error::InvalidData(format!(
                    "goal target must be positive, got {} cents",
                    target
                )));
            }
        }

        let conn = self.conn()?;
        if let Some(name) = name {
            conn.execute(
                "UPDATE goals SET name = ? WHERE id = ? AND owner_id = ?",
                params![name, id, owner_id],
            )?;
        }
        if let Some(target) = target_cents {
            conn.execute(
                "UPDATE goals SET target_cents = ? WHERE id = ? AND owner_id = ?",
                params![target, id, owner_id],
            )?;
        }
        if let Some(date) = target_date {
            conn.execute(
                "UPDATE goals SET target_date = ? WHERE id = ? AND owner_id = ?",
                params![date.to_string(), id, owner_id],
            )?;
        }
        drop(conn);

        self.get_goal(id, owner_id)
    }

    /// Delete a goal
    pub fn delete_goal(&self, id: i64, owner_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM goals WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("goal {}", id)));
        }
        Ok(())
    }
}
