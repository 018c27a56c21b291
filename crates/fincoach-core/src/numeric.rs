//! Numeric core: interest, present/future value and amortization
//!
//! Every function validates its inputs first and only then computes, so a
//! failure never yields a partial result. All functions are pure: identical
//! inputs always produce identical outputs.
//!
//! Money results are rounded to cents with midpoint-away-from-zero rounding.

use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::{ensure, Error, Result};

const MONTHS_PER_YEAR: u32 = 12;

/// Round a money amount to cents
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn overflow(what: &str) -> Error {
    Error::InvalidInput(format!("{} is too large to compute", what))
}

/// `base^exp`, exact when `exp` is a whole number
fn pow(base: Decimal, exp: Decimal) -> Result<Decimal> {
    let value = if exp.fract().is_zero() {
        let whole = exp.to_u64().ok_or_else(|| overflow("exponent"))?;
        base.checked_powu(whole)
    } else {
        base.checked_powd(exp)
    };
    value.ok_or_else(|| overflow("growth factor"))
}

/// `(1 + rate)^periods`
fn growth_factor(rate: Decimal, periods: u32) -> Result<Decimal> {
    let base = Decimal::ONE.checked_add(rate).ok_or_else(|| overflow("rate"))?;
    pow(base, Decimal::from(periods))
}

/// Simple interest earned: `principal * rate * time`
pub fn simple_interest(principal: Decimal, rate: Decimal, time: Decimal) -> Result<Decimal> {
    ensure(!principal.is_sign_negative(), || {
        format!("principal must not be negative (got {})", principal)
    })?;
    ensure(!rate.is_sign_negative(), || format!("rate must not be negative (got {})", rate))?;
    ensure(!time.is_sign_negative(), || format!("time must not be negative (got {})", time))?;

    let interest = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(time))
        .ok_or_else(|| overflow("simple interest"))?;
    Ok(round_money(interest))
}

/// Compound interest earned: `principal * (1 + rate/n)^(n*years) - principal`
///
/// `rate` is the annual nominal rate.
pub fn compound_interest(
    principal: Decimal,
    rate: Decimal,
    compounds_per_year: u32,
    years: Decimal,
) -> Result<Decimal> {
    ensure(compounds_per_year > 0, || {
        "compounds_per_year must be greater than zero".to_string()
    })?;
    ensure(!principal.is_sign_negative(), || {
        format!("principal must not be negative (got {})", principal)
    })?;
    ensure(!rate.is_sign_negative(), || format!("rate must not be negative (got {})", rate))?;
    ensure(!years.is_sign_negative(), || format!("years must not be negative (got {})", years))?;

    let n = Decimal::from(compounds_per_year);
    let base = Decimal::ONE
        .checked_add(rate / n)
        .ok_or_else(|| overflow("rate"))?;
    let periods = n.checked_mul(years).ok_or_else(|| overflow("compounding periods"))?;
    let growth = pow(base, periods)?;
    let amount = principal
        .checked_mul(growth)
        .ok_or_else(|| overflow("compound amount"))?;
    Ok(round_money(amount - principal))
}

/// Value of `present` after `periods` at `rate_per_period`
pub fn future_value(present: Decimal, rate_per_period: Decimal, periods: u32) -> Result<Decimal> {
    ensure(!present.is_sign_negative(), || {
        format!("present value must not be negative (got {})", present)
    })?;
    ensure(!rate_per_period.is_sign_negative(), || {
        format!("rate must not be negative (got {})", rate_per_period)
    })?;

    let growth = growth_factor(rate_per_period, periods)?;
    present
        .checked_mul(growth)
        .map(round_money)
        .ok_or_else(|| overflow("future value"))
}

/// Amount needed today to reach `future` after `periods` at `rate_per_period`
pub fn present_value(future: Decimal, rate_per_period: Decimal, periods: u32) -> Result<Decimal> {
    ensure(!future.is_sign_negative(), || {
        format!("future value must not be negative (got {})", future)
    })?;
    ensure(!rate_per_period.is_sign_negative(), || {
        format!("rate must not be negative (got {})", rate_per_period)
    })?;

    let growth = growth_factor(rate_per_period, periods)?;
    future
        .checked_div(growth)
        .map(round_money)
        .ok_or_else(|| overflow("present value"))
}

/// One row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: Decimal,
    pub interest_portion: Decimal,
    pub principal_portion: Decimal,
    pub remaining_balance: Decimal,
}

/// Totals over a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub total_paid: Decimal,
    pub total_interest: Decimal,
}

impl ScheduleSummary {
    pub fn of(schedule: &[AmortizationRow]) -> Result<Self> {
        let mut total_paid = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        for row in schedule {
            total_paid = total_paid
                .checked_add(row.payment)
                .ok_or_else(|| overflow("total paid"))?;
            total_interest = total_interest
                .checked_add(row.interest_portion)
                .ok_or_else(|| overflow("total interest"))?;
        }
        Ok(Self {
            periods: schedule.last().map(|r| r.period).unwrap_or(0),
            total_paid,
            total_interest,
        })
    }
}

fn validate_loan(principal: Decimal, annual_rate: Decimal, term_months: u32) -> Result<()> {
    ensure(term_months > 0, || "term_months must be greater than zero".to_string())?;
    ensure(!annual_rate.is_sign_negative(), || {
        format!("annual_rate must not be negative (got {})", annual_rate)
    })?;
    ensure(principal > Decimal::ZERO, || {
        format!("principal must be positive (got {})", principal)
    })
}

/// Fixed monthly payment that retires `principal` over `term_months`, in cents
///
/// Normally the exact payment rounded to the nearest cent. When rounding up
/// would retire the loan before the final month, the payment is truncated to
/// the cent instead and the final row absorbs the difference, so a schedule
/// always runs the full term.
pub fn monthly_payment(principal: Decimal, annual_rate: Decimal, term_months: u32) -> Result<Decimal> {
    validate_loan(principal, annual_rate, term_months)?;
    scheduled_payment(principal, annual_rate, term_months)
}

fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / Decimal::from(MONTHS_PER_YEAR)
}

/// Unrounded level payment
fn level_payment(principal: Decimal, annual_rate: Decimal, term_months: u32) -> Result<Decimal> {
    let n = Decimal::from(term_months);
    let r = monthly_rate(annual_rate);
    if r.is_zero() {
        return Ok(principal / n);
    }

    let factor = growth_factor(r, term_months)?;
    principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(factor - Decimal::ONE))
        .ok_or_else(|| overflow("monthly payment"))
}

fn scheduled_payment(principal: Decimal, annual_rate: Decimal, term_months: u32) -> Result<Decimal> {
    let exact = level_payment(principal, annual_rate, term_months)?;
    let rounded = round_money(exact);
    if rounded <= exact {
        return Ok(rounded);
    }

    let rows = run_schedule(principal, monthly_rate(annual_rate), rounded, Some(term_months), term_months)?;
    if rows.len() as u32 == term_months {
        Ok(rounded)
    } else {
        Ok(exact.round_dp_with_strategy(2, RoundingStrategy::ToZero))
    }
}

/// Pay `installment` a month until the balance is gone or `max_periods` pass
///
/// The row for `last_period`, when given, retires whatever balance remains.
fn run_schedule(
    principal: Decimal,
    monthly_rate: Decimal,
    installment: Decimal,
    last_period: Option<u32>,
    max_periods: u32,
) -> Result<Vec<AmortizationRow>> {
    let mut schedule = Vec::new();
    let mut balance = principal;

    for period in 1..=max_periods {
        let interest = balance
            .checked_mul(monthly_rate)
            .map(round_money)
            .ok_or_else(|| overflow("interest"))?;
        let mut principal_portion = installment
            .checked_sub(interest)
            .ok_or_else(|| overflow("principal portion"))?
            .max(Decimal::ZERO);
        if Some(period) == last_period || principal_portion >= balance {
            principal_portion = balance;
        }
        balance -= principal_portion;

        schedule.push(AmortizationRow {
            period,
            payment: interest
                .checked_add(principal_portion)
                .ok_or_else(|| overflow("payment"))?,
            interest_portion: interest,
            principal_portion,
            remaining_balance: balance,
        });

        if balance.is_zero() {
            break;
        }
    }

    Ok(schedule)
}

/// Standard fixed-payment amortization schedule
///
/// Always `term_months` rows. The final row absorbs the rounding residual so
/// its remaining balance is exactly zero and the principal portions sum to
/// `principal`.
pub fn amortization_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    term_months: u32,
) -> Result<Vec<AmortizationRow>> {
    amortization_schedule_with_extra(principal, annual_rate, term_months, Decimal::ZERO)
}

/// Amortization schedule with an extra principal payment every month
///
/// The schedule stops as soon as the balance reaches zero, which with a
/// positive `extra` happens before `term_months`.
pub fn amortization_schedule_with_extra(
    principal: Decimal,
    annual_rate: Decimal,
    term_months: u32,
    extra: Decimal,
) -> Result<Vec<AmortizationRow>> {
    validate_loan(principal, annual_rate, term_months)?;
    ensure(!extra.is_sign_negative(), || {
        format!("extra payment must not be negative (got {})", extra)
    })?;

    let payment = scheduled_payment(principal, annual_rate, term_months)?;
    let installment = payment
        .checked_add(extra)
        .ok_or_else(|| overflow("payment plus extra"))?;
    let schedule = run_schedule(
        principal,
        monthly_rate(annual_rate),
        installment,
        Some(term_months),
        term_months,
    )?;

    tracing::debug!(
        principal = %principal,
        periods = schedule.len(),
        payment = %payment,
        "Built amortization schedule"
    );

    Ok(schedule)
}

/// Schedule for paying a fixed `payment` each month until the loan is gone
///
/// Returns `None` when the balance is not cleared within `max_months`,
/// which is always the case once the payment no longer covers the interest.
pub fn payoff_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    payment: Decimal,
    max_months: u32,
) -> Result<Option<Vec<AmortizationRow>>> {
    ensure(max_months > 0, || "max_months must be greater than zero".to_string())?;
    validate_loan(principal, annual_rate, max_months)?;
    ensure(payment > Decimal::ZERO, || {
        format!("payment must be positive (got {})", payment)
    })?;

    let schedule = run_schedule(principal, monthly_rate(annual_rate), payment, None, max_months)?;
    let cleared = schedule.last().is_some_and(|r| r.remaining_balance.is_zero());
    Ok(cleared.then_some(schedule))
}
