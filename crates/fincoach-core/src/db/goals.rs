//! Goal and contribution operations
//!
//! A goal's current amount is never stored; it is the sum of its
//! contribution events.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::{params, OptionalExtension};

use super::{parse_col, timestamp_col, Database};
use crate::error::{ensure, Error, Result};
use crate::models::{Goal, GoalContribution};

impl Database {
    /// Create a goal with nothing saved yet
    pub fn create_goal(
        &self,
        profile_id: i64,
        description: &str,
        target_amount: Decimal,
        target_date: NaiveDate,
    ) -> Result<i64> {
        ensure(target_amount > Decimal::ZERO, || {
            format!("goal target must be positive (got {})", target_amount)
        })?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO goals (profile_id, description, target_amount, target_date) VALUES (?, ?, ?, ?)",
            params![
                profile_id,
                description,
                target_amount.to_string(),
                target_date.to_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a goal with its current amount
    pub fn get_goal(&self, id: i64) -> Result<Option<Goal>> {
        let goal = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT id, description, target_amount, target_date FROM goals WHERE id = ?",
                params![id],
                |row| {
                    Ok(Goal {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        target_amount: parse_col(row, 2)?,
                        target_date: parse_col(row, 3)?,
                        current_amount: Decimal::ZERO,
                    })
                },
            )
            .optional()?
        };

        match goal {
            Some(mut goal) => {
                goal.current_amount = self.contributed_total(goal.id)?;
                Ok(Some(goal))
            }
            None => Ok(None),
        }
    }

    /// A profile's goals in creation order
    pub fn list_goals(&self, profile_id: i64) -> Result<Vec<Goal>> {
        let ids: Vec<i64> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare("SELECT id FROM goals WHERE profile_id = ? ORDER BY id")?;
            let ids = stmt
                .query_map(params![profile_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids
        };

        let mut goals = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(goal) = self.get_goal(id)? {
                goals.push(goal);
            }
        }
        Ok(goals)
    }

    /// Record a contribution event and return the updated goal
    pub fn record_contribution(&self, goal_id: i64, amount: Decimal) -> Result<Goal> {
        let goal = self
            .get_goal(goal_id)?
            .ok_or_else(|| Error::NotFound(format!("goal {}", goal_id)))?;
        // Validates the amount before anything is written
        let updated = goal.contribute(amount)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO goal_contributions (goal_id, amount) VALUES (?, ?)",
            params![goal_id, amount.to_string()],
        )?;

        tracing::debug!(goal_id, amount = %amount, "Recorded contribution");
        Ok(updated)
    }

    /// Delete a goal together with its contribution events
    pub fn delete_goal(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let contributions = tx.execute("DELETE FROM goal_contributions WHERE goal_id = ?", params![id])?;
        let deleted = tx.execute("DELETE FROM goals WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("goal {}", id)));
        }
        tx.commit()?;

        tracing::debug!(goal_id = id, contributions, "Deleted goal");
        Ok(())
    }

    pub fn list_contributions(&self, goal_id: i64) -> Result<Vec<GoalContribution>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, goal_id, amount, contributed_at FROM goal_contributions WHERE goal_id = ? ORDER BY id",
        )?;

        let contributions = stmt
            .query_map(params![goal_id], |row| {
                Ok(GoalContribution {
                    id: row.get(0)?,
                    goal_id: row.get(1)?,
                    amount: parse_col(row, 2)?,
                    contributed_at: timestamp_col(row, 3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contributions)
    }

    /// Sum contributions in Rust; SQLite would sum TEXT as floating point
    fn contributed_total(&self, goal_id: i64) -> Result<Decimal> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT amount FROM goal_contributions WHERE goal_id = ?")?;
        let amounts = stmt
            .query_map(params![goal_id], |row| parse_col::<Decimal>(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(amounts.into_iter().sum())
    }
}
