//! Loan repayment with an early-payoff what-if
//!
//! When a salary is given the comparison also covers an income-based plan,
//! which pays a fixed share of monthly income until the balance is gone.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, non_negative, Comparison, ScenarioInputs, ScenarioType, SimulationResult, Simulator};
use crate::config::SimulatorConfig;
use crate::error::{ensure, Error, Result};
use crate::numeric::{
    amortization_schedule, amortization_schedule_with_extra, monthly_payment, overflow,
    payoff_schedule, round_money, AmortizationRow, ScheduleSummary,
};

/// Longest income-based plan followed before calling the loan unrepaid
pub const IBR_HORIZON_MONTHS: u32 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub principal: Decimal,
    /// Nominal annual rate as a fraction (0.05 = 5%)
    pub annual_rate: Decimal,
    pub term_months: u32,
    #[serde(default)]
    pub extra_monthly_payment: Decimal,
    /// Expected gross salary, for the affordability check
    #[serde(default)]
    pub annual_salary: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanRisk {
    Low,
    Medium,
    High,
}

impl LoanRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanRisk::Low => "low",
            LoanRisk::Medium => "medium",
            LoanRisk::High => "high",
        }
    }
}

impl fmt::Display for LoanRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One repayment plan and its full schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanScenario {
    /// Scheduled monthly outlay, including any extra payment
    pub monthly_payment: Decimal,
    pub summary: ScheduleSummary,
    pub schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAffordability {
    /// Monthly outlay as percent of monthly salary
    pub payment_to_income_pct: Decimal,
    pub risk: LoanRisk,
}

/// Repayment at a fixed share of monthly income
///
/// `estimated_months` and the totals are `None` when the plan never clears
/// the balance: either the payment does not cover the monthly interest, or
/// payoff would take longer than [`IBR_HORIZON_MONTHS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBasedPlan {
    pub monthly_payment: Decimal,
    pub covers_interest: bool,
    pub estimated_months: Option<u32>,
    pub total_repaid: Option<Decimal>,
    pub total_interest: Option<Decimal>,
}

impl IncomeBasedPlan {
    pub fn repays(&self) -> bool {
        self.estimated_months.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    pub baseline: LoanScenario,
    /// Present only when an extra monthly payment was requested
    pub accelerated: Option<LoanScenario>,
    pub months_saved: u32,
    pub interest_saved: Decimal,
    pub affordability: Option<LoanAffordability>,
    /// The remaining fields need an expected salary
    #[serde(default)]
    pub income_based: Option<IncomeBasedPlan>,
    /// Principal over annual salary
    #[serde(default)]
    pub loan_to_income_ratio: Option<Decimal>,
}

#[derive(Default)]
pub struct LoanSimulator {
    config: SimulatorConfig,
}

impl LoanSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn risk_for(&self, pct: Decimal) -> LoanRisk {
        if pct > self.config.loan_high_risk_pct {
            LoanRisk::High
        } else if pct > self.config.loan_medium_risk_pct {
            LoanRisk::Medium
        } else {
            LoanRisk::Low
        }
    }

    fn income_based(&self, input: &LoanInputs, monthly_salary: Decimal) -> Result<IncomeBasedPlan> {
        let payment = monthly_salary
            .checked_mul(self.config.ibr_income_pct / Decimal::ONE_HUNDRED)
            .map(round_money)
            .ok_or_else(|| overflow("income-based payment"))?;
        let first_interest = input
            .principal
            .checked_mul(input.annual_rate / Decimal::from(12))
            .map(round_money)
            .ok_or_else(|| overflow("monthly interest"))?;

        let unrepaid = |covers_interest| IncomeBasedPlan {
            monthly_payment: payment,
            covers_interest,
            estimated_months: None,
            total_repaid: None,
            total_interest: None,
        };
        if payment <= first_interest {
            return Ok(unrepaid(false));
        }

        let Some(schedule) =
            payoff_schedule(input.principal, input.annual_rate, payment, IBR_HORIZON_MONTHS)?
        else {
            return Ok(unrepaid(true));
        };
        let summary = ScheduleSummary::of(&schedule)?;
        Ok(IncomeBasedPlan {
            monthly_payment: payment,
            covers_interest: true,
            estimated_months: Some(summary.periods),
            total_repaid: Some(summary.total_paid),
            total_interest: Some(summary.total_interest),
        })
    }
}

impl Simulator for LoanSimulator {
    type Input = LoanInputs;

    fn scenario_type(&self) -> ScenarioType {
        ScenarioType::LoanRepayment
    }

    fn run(&self, input: &LoanInputs) -> Result<SimulationResult> {
        non_negative("extra_monthly_payment", input.extra_monthly_payment)?;
        if let Some(salary) = input.annual_salary {
            ensure(salary > Decimal::ZERO, || {
                format!("annual_salary must be positive (got {})", salary)
            })?;
        }

        let payment = monthly_payment(input.principal, input.annual_rate, input.term_months)?;
        let schedule = amortization_schedule(input.principal, input.annual_rate, input.term_months)?;
        let baseline = LoanScenario {
            monthly_payment: payment,
            summary: ScheduleSummary::of(&schedule)?,
            schedule,
        };

        let extra = input.extra_monthly_payment;
        let accelerated = if extra > Decimal::ZERO {
            let schedule = amortization_schedule_with_extra(
                input.principal,
                input.annual_rate,
                input.term_months,
                extra,
            )?;
            Some(LoanScenario {
                monthly_payment: payment
                    .checked_add(extra)
                    .ok_or_else(|| overflow("monthly payment"))?,
                summary: ScheduleSummary::of(&schedule)?,
                schedule,
            })
        } else {
            None
        };

        let (months_saved, interest_saved) = match &accelerated {
            Some(fast) => (
                baseline.summary.periods.saturating_sub(fast.summary.periods),
                baseline.summary.total_interest - fast.summary.total_interest,
            ),
            None => (0, Decimal::ZERO),
        };

        let outlay = payment.checked_add(extra).ok_or_else(|| overflow("monthly payment"))?;
        let monthly_salary = input.annual_salary.map(|salary| salary / Decimal::from(12));
        let affordability = monthly_salary
            .map(|monthly| {
                let pct = outlay
                    .checked_div(monthly)
                    .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
                    .map(round_money)
                    .ok_or_else(|| overflow("payment to income"))?;
                Ok::<_, Error>(LoanAffordability {
                    payment_to_income_pct: pct,
                    risk: self.risk_for(pct),
                })
            })
            .transpose()?;
        let income_based = monthly_salary
            .map(|monthly| self.income_based(input, monthly))
            .transpose()?;
        let loan_to_income_ratio = input
            .annual_salary
            .map(|salary| {
                input
                    .principal
                    .checked_div(salary)
                    .map(round_money)
                    .ok_or_else(|| overflow("loan to income ratio"))
            })
            .transpose()?;

        let mut recommendation = match &accelerated {
            Some(fast) => format!(
                "Paying {} extra each month clears the loan in {} months instead of {}, saving {} in interest",
                money(extra),
                fast.summary.periods,
                baseline.summary.periods,
                money(interest_saved)
            ),
            None => format!(
                "Standard repayment: {}/month for {} months, {} total interest",
                money(payment),
                baseline.summary.periods,
                money(baseline.summary.total_interest)
            ),
        };
        if let Some(a) = &affordability {
            if a.risk != LoanRisk::Low {
                recommendation.push_str(&format!(
                    ". Payments take {}% of expected income ({} risk)",
                    a.payment_to_income_pct, a.risk
                ));
            }
        }
        if let Some(plan) = &income_based {
            if plan.monthly_payment < payment {
                match plan.estimated_months {
                    Some(months) => recommendation.push_str(&format!(
                        ". Income-based repayment lowers the payment to {}/month but takes {} months and costs {} in interest",
                        money(plan.monthly_payment),
                        months,
                        money(plan.total_interest.unwrap_or_default())
                    )),
                    None => recommendation.push_str(&format!(
                        ". Income-based repayment at {}/month would not fully repay the loan",
                        money(plan.monthly_payment)
                    )),
                }
            }
        }

        tracing::debug!(
            principal = %input.principal,
            months_saved,
            interest_saved = %interest_saved,
            "Loan simulation complete"
        );

        Ok(SimulationResult::new(
            ScenarioInputs::LoanRepayment(input.clone()),
            Comparison::LoanRepayment(LoanComparison {
                baseline,
                accelerated,
                months_saved,
                interest_saved,
                affordability,
                income_based,
                loan_to_income_ratio,
            }),
            recommendation,
        ))
    }
}
