//! Budget summary: income vs. spending over an analysis window

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::AnalysisWindow;
use crate::error::{Error, Result};
use crate::models::{Category, Transaction, UserProfile};
use crate::numeric::round_money;

/// Where the income figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSource {
    /// Sum of recorded income transactions
    Recorded,
    /// Profile monthly income times the number of months
    Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub periods: usize,
    pub income: Decimal,
    pub income_source: IncomeSource,
    /// Net spending across non-income categories, as a positive amount
    pub expenses: Decimal,
    /// Income left after expenses (negative when overspent)
    pub remaining: Decimal,
    /// `remaining / income` as a percent; zero when there is no income
    pub savings_rate_pct: Decimal,
    pub balanced: bool,
    /// Each category's spending as a percent of income
    pub expense_ratios: BTreeMap<Category, Decimal>,
}

/// Summarize income against spending for the transactions inside `window`
pub fn summarize_budget(
    transactions: &[Transaction],
    window: AnalysisWindow,
    profile: &UserProfile,
) -> Result<BudgetSummary> {
    if profile.monthly_income.is_sign_negative() {
        return Err(Error::InvalidInput(format!(
            "monthly_income must not be negative (got {})",
            profile.monthly_income
        )));
    }

    let periods = window.periods();
    let in_window = transactions.iter().filter(|t| window.contains(t.date));

    let mut recorded_income = Decimal::ZERO;
    let mut has_income = false;
    let mut spent: BTreeMap<Category, Decimal> = BTreeMap::new();
    for tx in in_window {
        if tx.category.is_income() {
            recorded_income += tx.amount;
            has_income = true;
        } else {
            *spent.entry(tx.category).or_default() -= tx.amount;
        }
    }

    let (income, income_source) = if has_income {
        (recorded_income, IncomeSource::Recorded)
    } else {
        (
            profile.monthly_income * Decimal::from(periods),
            IncomeSource::Profile,
        )
    };

    let expenses: Decimal = spent.values().copied().sum();
    let remaining = income - expenses;
    let percent_of_income = |amount: Decimal| {
        if income > Decimal::ZERO {
            round_money(amount / income * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        }
    };

    let expense_ratios = spent
        .iter()
        .map(|(category, amount)| (*category, percent_of_income(*amount)))
        .collect();

    Ok(BudgetSummary {
        periods,
        income,
        income_source,
        expenses,
        remaining,
        savings_rate_pct: percent_of_income(remaining),
        balanced: remaining >= Decimal::ZERO,
        expense_ratios,
    })
}
