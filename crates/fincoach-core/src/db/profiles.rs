//! Profile operations

use rust_decimal::Decimal;
use rusqlite::{params, OptionalExtension};

use super::{parse_col, Database};
use crate::error::{ensure, Error, Result};
use crate::models::{RiskTolerance, UserProfile};

fn check_income(monthly_income: Decimal) -> Result<()> {
    ensure(!monthly_income.is_sign_negative(), || {
        format!("monthly_income must not be negative (got {})", monthly_income)
    })
}

impl Database {
    /// Create a profile, returning its ID
    pub fn create_profile(
        &self,
        name: &str,
        monthly_income: Decimal,
        risk_tolerance: RiskTolerance,
    ) -> Result<i64> {
        ensure(!name.trim().is_empty(), || "profile name must not be empty".to_string())?;
        check_income(monthly_income)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profiles (name, monthly_income, risk_tolerance) VALUES (?, ?, ?)",
            params![name.trim(), monthly_income.to_string(), risk_tolerance.as_str()],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(profile_id = id, "Created profile");
        Ok(id)
    }

    /// Get a profile with its goals
    pub fn get_profile(&self, id: i64) -> Result<Option<UserProfile>> {
        let profile = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT id, name, monthly_income, risk_tolerance FROM profiles WHERE id = ?",
                params![id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        monthly_income: parse_col(row, 2)?,
                        risk_tolerance: parse_col(row, 3)?,
                        goals: Vec::new(),
                    })
                },
            )
            .optional()?
        };

        match profile {
            Some(mut profile) => {
                profile.goals = self.list_goals(profile.id)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Get a profile or fail with `NotFound`
    pub fn require_profile(&self, id: i64) -> Result<UserProfile> {
        self.get_profile(id)?
            .ok_or_else(|| Error::NotFound(format!("profile {}", id)))
    }

    /// List all profiles (with goals), by ID
    pub fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let ids: Vec<i64> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids
        };

        ids.into_iter().map(|id| self.require_profile(id)).collect()
    }

    pub fn update_monthly_income(&self, id: i64, monthly_income: Decimal) -> Result<()> {
        check_income(monthly_income)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET monthly_income = ? WHERE id = ?",
            params![monthly_income.to_string(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile {}", id)));
        }
        Ok(())
    }

    pub fn update_risk_tolerance(&self, id: i64, risk_tolerance: RiskTolerance) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET risk_tolerance = ? WHERE id = ?",
            params![risk_tolerance.as_str(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile {}", id)));
        }
        Ok(())
    }
}
