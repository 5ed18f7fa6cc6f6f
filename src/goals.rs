//! Goal contribution capper
//!
//! Contributions advance a goal's current amount, hard-capped at the
//! target. The cap is enforced only here, at contribution time: editing the
//! target downward below the current amount leaves the current amount
//! untouched (see DESIGN.md).

use crate::db::{goals, Database};
use crate::error::{Error, Result};
use crate::models::Goal;

/// Outcome of a goal contribution
#[derive(Debug, Clone)]
pub struct ContributionOutcome {
    pub goal: Goal,
    /// True when the raw sum exceeded the target and was capped
    pub capped: bool,
}

/// Apply the cap to a goal value pair. Pure; the persistence wrapper is
/// [`contribute`].
pub fn apply_contribution(
    target_cents: i64,
    current_cents: i64,
    amount_cents: i64,
) -> Result<(i64, bool)> {
    if amount_cents <= 0 {
        return Err(Error::InvalidContribution(amount_cents));
    }
    let raw = current_cents.saturating_add(amount_cents);
    if raw > target_cents {
        Ok((target_cents, true))
    } else {
        Ok((raw, false))
    }
}

/// Contribute to a stored goal, returning the updated goal and whether the
/// contribution was capped
pub fn contribute(
    db: &Database,
    goal_id: i64,
    owner_id: i64,
    amount_cents: i64,
) -> Result<ContributionOutcome> {
    let goal = db.get_goal(goal_id, owner_id)?;
    let (new_current, capped) =
        apply_contribution(goal.target_cents, goal.current_cents, amount_cents)?;

    {
        let conn = db.conn()?;
        goals::set_current(&conn, goal.id, new_current)?;
    }

    let goal = db.get_goal(goal_id, owner_id)?;
    Ok(ContributionOutcome { goal, capped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_without_cap() {
        let (current, capped) = apply_contribution(500_000, 100_000, 25_000).unwrap();
        assert_eq!(current, 125_000);
        assert!(!capped);
    }

    #[test]
    fn test_contribution_capped_at_target() {
        // target=5000.00, current=4990.00, amount=50.00 -> exactly 5000.00, capped
        let (current, capped) = apply_contribution(500_000, 499_000, 5_000).unwrap();
        assert_eq!(current, 500_000);
        assert!(capped);
    }

    #[test]
    fn test_exact_fill_is_not_capped() {
        let (current, capped) = apply_contribution(500_000, 499_000, 1_000).unwrap();
        assert_eq!(current, 500_000);
        assert!(!capped);
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert!(matches!(
            apply_contribution(500_000, 0, 0),
            Err(Error::InvalidContribution(0))
        ));
        assert!(matches!(
            apply_contribution(500_000, 0, -100),
            Err(Error::InvalidContribution(-100))
        ));
    }

    #[test]
    fn test_contribute_persists() {
        let db = Database::in_memory().unwrap();
        let goal = db.create_goal(1, "Trip", 500_000, None).unwrap();

        let outcome = contribute(&db, goal.id, 1, 499_000).unwrap();
        assert_eq!(outcome.goal.current_cents, 499_000);
        assert!(!outcome.capped);

        let outcome = contribute(&db, goal.id, 1, 5_000).unwrap();
        assert_eq!(outcome.goal.current_cents, 500_000);
        assert!(outcome.capped);
    }

    #[test]
    fn test_target_reduction_leaves_current_unclamped() {
        let db = Database::in_memory().unwrap();
        let goal = db.create_goal(1, "Trip", 500_000, None).unwrap();
        contribute(&db, goal.id, 1, 400_000).unwrap();

        // Lower the target below the current amount; current stays put
        let updated = db
            .update_goal(goal.id, 1, None, Some(300_000), None)
            .unwrap();
        assert_eq!(updated.target_cents, 300_000);
        assert_eq!(updated.current_cents, 400_000);

        // The next contribution hits the cap immediately
        let outcome = contribute(&db, goal.id, 1, 1_000).unwrap();
        assert_eq!(outcome.goal.current_cents, 300_000);
        assert!(outcome.capped);
    }
}
