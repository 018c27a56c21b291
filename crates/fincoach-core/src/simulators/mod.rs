//! What-if simulators
//!
//! Each simulator is a pure transformation from scenario inputs to a
//! [`SimulationResult`]. They share no state, so running one twice with the
//! same inputs yields equal results.
//!
//! ## Scenarios
//!
//! - **Housing** - Compare monthly cost of housing options against income
//! - **Meal plan** - Cost and time per month of a campus meal plan vs. groceries
//! - **Work-study** - Earnings vs. personal time and projected GPA for weekly work hours
//! - **Loan repayment** - Amortization with an optional extra monthly payment and an
//!   income-based plan
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fincoach_core::simulators::{HousingSimulator, Simulator};
//!
//! let sim = HousingSimulator::new(config.simulators.clone())?;
//! let result = sim.run(&inputs)?;
//! println!("{}", result.recommendation);
//! ```

pub mod housing;
pub mod loan;
pub mod meal_plan;
pub mod work_study;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SimulatorConfig;
use crate::error::{ensure, Result};
use crate::numeric::round_money;

pub use housing::{HousingComparison, HousingInputs, HousingOption, HousingRow, HousingSimulator};
pub use loan::{
    IncomeBasedPlan, LoanAffordability, LoanComparison, LoanInputs, LoanRisk, LoanScenario, LoanSimulator,
    IBR_HORIZON_MONTHS,
};
pub use meal_plan::{MealOption, MealPlanComparison, MealPlanInputs, MealPlanSimulator};
pub use work_study::{WorkStudyComparison, WorkStudyInputs, WorkStudyRow, WorkStudySimulator};

/// Kind of what-if scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Housing,
    MealPlan,
    WorkStudy,
    LoanRepayment,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Housing => "housing",
            ScenarioType::MealPlan => "meal_plan",
            ScenarioType::WorkStudy => "work_study",
            ScenarioType::LoanRepayment => "loan_repayment",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScenarioType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "housing" => Ok(ScenarioType::Housing),
            "meal_plan" => Ok(ScenarioType::MealPlan),
            "work_study" => Ok(ScenarioType::WorkStudy),
            "loan_repayment" => Ok(ScenarioType::LoanRepayment),
            _ => Err(format!("Unknown scenario type: {}", s)),
        }
    }
}

/// Snapshot of the inputs a simulation ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioInputs {
    Housing(HousingInputs),
    MealPlan(MealPlanInputs),
    WorkStudy(WorkStudyInputs),
    LoanRepayment(LoanInputs),
}

impl ScenarioInputs {
    pub fn scenario_type(&self) -> ScenarioType {
        match self {
            ScenarioInputs::Housing(_) => ScenarioType::Housing,
            ScenarioInputs::MealPlan(_) => ScenarioType::MealPlan,
            ScenarioInputs::WorkStudy(_) => ScenarioType::WorkStudy,
            ScenarioInputs::LoanRepayment(_) => ScenarioType::LoanRepayment,
        }
    }
}

/// Scenario-specific comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Comparison {
    Housing(HousingComparison),
    MealPlan(MealPlanComparison),
    WorkStudy(WorkStudyComparison),
    LoanRepayment(LoanComparison),
}

/// Outcome of one simulation run. Never modified after it is produced;
/// running again creates a new result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario_type: ScenarioType,
    pub inputs: ScenarioInputs,
    pub comparison: Comparison,
    pub recommendation: String,
}

impl SimulationResult {
    fn new(inputs: ScenarioInputs, comparison: Comparison, recommendation: String) -> Self {
        Self {
            scenario_type: inputs.scenario_type(),
            inputs,
            comparison,
            recommendation,
        }
    }
}

/// A what-if scenario runner
pub trait Simulator {
    type Input;

    fn scenario_type(&self) -> ScenarioType;

    /// Validate the inputs, then compute the comparison
    fn run(&self, input: &Self::Input) -> Result<SimulationResult>;
}

/// Run whichever simulator matches `inputs`
///
/// Used to re-run a stored scenario; the stored result itself is left alone.
pub fn run_scenario(config: &SimulatorConfig, inputs: &ScenarioInputs) -> Result<SimulationResult> {
    match inputs {
        ScenarioInputs::Housing(i) => HousingSimulator::new(config.clone())?.run(i),
        ScenarioInputs::MealPlan(i) => MealPlanSimulator.run(i),
        ScenarioInputs::WorkStudy(i) => WorkStudySimulator::new(config.clone())?.run(i),
        ScenarioInputs::LoanRepayment(i) => LoanSimulator::new(config.clone())?.run(i),
    }
}

fn non_negative(name: &str, value: Decimal) -> Result<()> {
    ensure(!value.is_sign_negative(), || {
        format!("{} must not be negative (got {})", name, value)
    })
}

/// Dollar amount for recommendation text, rounded to cents
fn money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_inputs() -> Vec<ScenarioInputs> {
        vec![
            ScenarioInputs::Housing(HousingInputs {
                options: vec![
                    HousingOption::new("Dorm", dec!(800), dec!(100), dec!(50)),
                    HousingOption::new("Apartment", dec!(600), dec!(150), dec!(100)),
                ],
                monthly_income: Some(dec!(2000)),
                timeframe_months: None,
            }),
            ScenarioInputs::MealPlan(MealPlanInputs {
                plan_cost: dec!(2000),
                plan_meals: 200,
                grocery_monthly: dec!(350),
                grocery_meals: 30,
            }),
            ScenarioInputs::WorkStudy(WorkStudyInputs {
                weekly_hours: dec!(15),
                hourly_wage: dec!(12.50),
                current_gpa: dec!(3.2),
            }),
            ScenarioInputs::LoanRepayment(LoanInputs {
                principal: dec!(10000),
                annual_rate: dec!(0.05),
                term_months: 120,
                extra_monthly_payment: dec!(50),
                annual_salary: Some(dec!(45000)),
            }),
        ]
    }

    #[test]
    fn test_scenario_type_roundtrip() {
        for t in [
            ScenarioType::Housing,
            ScenarioType::MealPlan,
            ScenarioType::WorkStudy,
            ScenarioType::LoanRepayment,
        ] {
            assert_eq!(t.as_str().parse::<ScenarioType>().unwrap(), t);
        }
        assert!("lottery".parse::<ScenarioType>().is_err());
    }

    #[test]
    fn test_simulators_are_idempotent() {
        let config = SimulatorConfig::default();
        for inputs in sample_inputs() {
            let first = run_scenario(&config, &inputs).unwrap();
            let second = run_scenario(&config, &inputs).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.scenario_type, inputs.scenario_type());
        }
    }

    #[test]
    fn test_result_survives_json() {
        let config = SimulatorConfig::default();
        for inputs in sample_inputs() {
            let result = run_scenario(&config, &inputs).unwrap();
            let json = serde_json::to_string(&result).unwrap();
            let back: SimulationResult = serde_json::from_str(&json).unwrap();
            assert_eq!(back, result);
        }
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec!(950)), "$950.00");
        assert_eq!(money(dec!(11.666)), "$11.67");
    }
}
