//! Savings goal progress
//!
//! A goal's saved amount only changes through contribution events, so
//! [`Goal::contribute`] returns a new goal instead of editing in place.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ensure, Result};
use crate::models::Goal;
use crate::numeric::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    InProgress,
    Completed,
    /// Target date has passed without reaching the target
    Overdue,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Goal {
    pub fn validate(&self) -> Result<()> {
        ensure(self.target_amount > Decimal::ZERO, || {
            format!("goal target must be positive (got {})", self.target_amount)
        })?;
        ensure(!self.current_amount.is_sign_negative(), || {
            format!("goal progress must not be negative (got {})", self.current_amount)
        })
    }

    /// Amount still to save, never negative
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Saved share of the target in percent, capped at 100
    pub fn progress_percent(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = self.current_amount / self.target_amount * Decimal::ONE_HUNDRED;
        round_money(pct.min(Decimal::ONE_HUNDRED))
    }

    pub fn status(&self, today: NaiveDate) -> GoalStatus {
        if self.is_complete() {
            GoalStatus::Completed
        } else if today > self.target_date {
            GoalStatus::Overdue
        } else {
            GoalStatus::InProgress
        }
    }

    /// Whole calendar months from `today` until the target date
    pub fn months_remaining(&self, today: NaiveDate) -> u32 {
        let months = (self.target_date.year() - today.year()) * 12
            + self.target_date.month() as i32
            - today.month() as i32
            - i32::from(self.target_date.day() < today.day());
        months.max(0) as u32
    }

    /// Monthly saving needed to hit the target on time
    ///
    /// With less than a month left the whole remainder is due now.
    pub fn monthly_contribution_needed(&self, today: NaiveDate) -> Decimal {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Decimal::ZERO;
        }
        let months = self.months_remaining(today).max(1);
        round_money(remaining / Decimal::from(months))
    }

    /// Apply a contribution event, returning the updated goal
    pub fn contribute(&self, amount: Decimal) -> Result<Goal> {
        ensure(amount > Decimal::ZERO, || {
            format!("contribution must be positive (got {})", amount)
        })?;
        Ok(Goal {
            current_amount: self.current_amount + amount,
            ..self.clone()
        })
    }
}

/// Totals across all of a user's goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsSummary {
    pub total_target: Decimal,
    pub total_saved: Decimal,
    pub overall_percent: Decimal,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

pub fn goals_summary(goals: &[Goal], today: NaiveDate) -> GoalsSummary {
    let total_target: Decimal = goals.iter().map(|g| g.target_amount).sum();
    let total_saved: Decimal = goals.iter().map(|g| g.current_amount).sum();
    let overall_percent = if total_target > Decimal::ZERO {
        round_money(total_saved / total_target * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };

    let count = |status: GoalStatus| goals.iter().filter(|g| g.status(today) == status).count();

    GoalsSummary {
        total_target,
        total_saved,
        overall_percent,
        completed: count(GoalStatus::Completed),
        in_progress: count(GoalStatus::InProgress),
        overdue: count(GoalStatus::Overdue),
    }
}
