//! Fixture builders shared by unit and integration tests

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Category, Goal, RiskTolerance, Transaction, UserProfile};

/// Shorthand for a calendar date; panics on an invalid date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Build a transaction with an empty note
pub fn tx(id: i64, date: NaiveDate, amount: Decimal, category: Category) -> Transaction {
    Transaction {
        id,
        date,
        amount,
        category,
        note: String::new(),
    }
}

/// A goal-less profile with the given monthly income
pub fn profile(monthly_income: Decimal) -> UserProfile {
    UserProfile {
        id: 1,
        name: "Test Student".to_string(),
        monthly_income,
        goals: Vec::new(),
        risk_tolerance: RiskTolerance::Moderate,
    }
}

/// A goal with nothing saved yet
pub fn goal(target_amount: Decimal, target_date: NaiveDate) -> Goal {
    Goal {
        id: 1,
        description: "Emergency Fund".to_string(),
        target_amount,
        target_date,
        current_amount: Decimal::ZERO,
    }
}

/// Three months of a typical student budget, with rising food spending and
/// one large entertainment purchase in March
pub fn semester_transactions() -> Vec<Transaction> {
    let mut txs = Vec::new();
    let mut id = 0;
    let mut push = |date: NaiveDate, amount: Decimal, category: Category| {
        id += 1;
        txs.push(tx(id, date, amount, category));
    };

    let food = [Decimal::from(-200), Decimal::from(-240), Decimal::from(-300)];
    for (i, month) in [1u32, 2, 3].into_iter().enumerate() {
        push(date(2024, month, 1), Decimal::from(2000), Category::Income);
        push(date(2024, month, 2), Decimal::from(-900), Category::Housing);
        push(date(2024, month, 10), food[i], Category::Food);
        push(date(2024, month, 12), Decimal::from(-60), Category::Transport);
        push(date(2024, month, 14), Decimal::from(-20), Category::Entertainment);
        push(date(2024, month, 21), Decimal::from(-20), Category::Entertainment);
    }
    push(date(2024, 3, 25), Decimal::from(-400), Category::Entertainment);

    txs
}
