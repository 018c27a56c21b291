//! Meal plan vs. groceries, in money and in time

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, non_negative, Comparison, ScenarioInputs, ScenarioType, SimulationResult, Simulator};
use crate::error::{ensure, Result};
use crate::numeric::{overflow, round_money};

/// Weekly hours spent on groceries when cooking for yourself
const SHOPPING_HOURS_PER_WEEK: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
const COOKING_HOURS_PER_WEEK: Decimal = Decimal::from_parts(7, 0, 0, false, 0);
const CLEANING_HOURS_PER_WEEK: Decimal = Decimal::from_parts(35, 0, 0, false, 1);
/// Walking to and waiting at the dining hall, per meal
const PLAN_HOURS_PER_MEAL: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

fn default_grocery_meals() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanInputs {
    /// Price of the whole plan
    pub plan_cost: Decimal,
    /// Meals the plan covers
    pub plan_meals: u32,
    /// Estimated monthly grocery spend
    pub grocery_monthly: Decimal,
    /// Meals per month the grocery budget covers
    #[serde(default = "default_grocery_meals")]
    pub grocery_meals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealOption {
    MealPlan,
    Groceries,
}

impl MealOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealOption::MealPlan => "meal plan",
            MealOption::Groceries => "groceries",
        }
    }
}

impl fmt::Display for MealOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanComparison {
    pub plan_cost_per_meal: Decimal,
    pub grocery_cost_per_meal: Decimal,
    pub per_meal_difference: Decimal,
    /// Saving per month from choosing the cheaper option
    pub monthly_saving: Decimal,
    pub cheaper: MealOption,
    /// Monthly hours eating every grocery-budget meal on the plan instead
    pub plan_hours_monthly: Decimal,
    /// Monthly hours shopping, cooking and cleaning up
    pub grocery_hours_monthly: Decimal,
    pub more_time_efficient: MealOption,
}

fn monthly_hours(input: &MealPlanInputs) -> (Decimal, Decimal) {
    let plan = PLAN_HOURS_PER_MEAL * Decimal::from(input.grocery_meals);
    let weekly = SHOPPING_HOURS_PER_WEEK + COOKING_HOURS_PER_WEEK + CLEANING_HOURS_PER_WEEK;
    let grocery = weekly * Decimal::from(52) / Decimal::from(12);
    (round_money(plan), round_money(grocery))
}

/// Stateless: the comparison has no policy knobs
#[derive(Debug, Default, Clone, Copy)]
pub struct MealPlanSimulator;

fn validate(input: &MealPlanInputs) -> Result<()> {
    non_negative("plan_cost", input.plan_cost)?;
    non_negative("grocery_monthly", input.grocery_monthly)?;
    ensure(input.plan_meals > 0, || "plan_meals must be at least 1".to_string())?;
    ensure(input.grocery_meals > 0, || {
        "grocery_meals must be at least 1".to_string()
    })
}

impl Simulator for MealPlanSimulator {
    type Input = MealPlanInputs;

    fn scenario_type(&self) -> ScenarioType {
        ScenarioType::MealPlan
    }

    fn run(&self, input: &MealPlanInputs) -> Result<SimulationResult> {
        validate(input)?;

        let plan = round_money(input.plan_cost / Decimal::from(input.plan_meals));
        let grocery = round_money(input.grocery_monthly / Decimal::from(input.grocery_meals));

        // Equal prices go to groceries, the more flexible choice
        let cheaper = if plan < grocery {
            MealOption::MealPlan
        } else {
            MealOption::Groceries
        };
        let per_meal_difference = (grocery - plan).abs();
        let monthly_saving = per_meal_difference
            .checked_mul(Decimal::from(input.grocery_meals))
            .ok_or_else(|| overflow("monthly saving"))?;

        let (plan_hours, grocery_hours) = monthly_hours(input);
        let more_time_efficient = if plan_hours < grocery_hours {
            MealOption::MealPlan
        } else {
            MealOption::Groceries
        };
        let hours_difference = (grocery_hours - plan_hours).abs();

        let mut recommendation = if per_meal_difference.is_zero() {
            format!(
                "Both cost {} per meal; groceries give you more flexibility",
                money(grocery)
            )
        } else {
            let (cheap_price, dear_price) = match cheaper {
                MealOption::MealPlan => (plan, grocery),
                MealOption::Groceries => (grocery, plan),
            };
            format!(
                "Choose {}: {} per meal vs {}, about {} saved per month",
                cheaper,
                money(cheap_price),
                money(dear_price),
                money(monthly_saving)
            )
        };
        if !hours_difference.is_zero() {
            if more_time_efficient == cheaper {
                recommendation.push_str(&format!(
                    ", and it frees about {} hours a month",
                    hours_difference.normalize()
                ));
            } else {
                recommendation.push_str(&format!(
                    ". Trade-off: {} saves about {} hours a month",
                    more_time_efficient,
                    hours_difference.normalize()
                ));
            }
        }

        tracing::debug!(plan = %plan, grocery = %grocery, cheaper = %cheaper, "Meal plan comparison complete");

        Ok(SimulationResult::new(
            ScenarioInputs::MealPlan(input.clone()),
            Comparison::MealPlan(MealPlanComparison {
                plan_cost_per_meal: plan,
                grocery_cost_per_meal: grocery,
                per_meal_difference,
                monthly_saving,
                cheaper,
                plan_hours_monthly: plan_hours,
                grocery_hours_monthly: grocery_hours,
                more_time_efficient,
            }),
            recommendation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    fn inputs(plan_cost: Decimal, plan_meals: u32, grocery_monthly: Decimal) -> MealPlanInputs {
        MealPlanInputs {
            plan_cost,
            plan_meals,
            grocery_monthly,
            grocery_meals: 30,
        }
    }

    fn comparison(result: &SimulationResult) -> &MealPlanComparison {
        match &result.comparison {
            Comparison::MealPlan(c) => c,
            other => panic!("unexpected comparison: {:?}", other),
        }
    }

    #[test]
    fn test_cheaper_meal_plan_is_recommended() {
        let result = MealPlanSimulator
            .run(&inputs(dec!(2000), 200, dec!(350)))
            .unwrap();
        let c = comparison(&result);

        assert_eq!(c.plan_cost_per_meal, dec!(10.00));
        assert_eq!(c.grocery_cost_per_meal, dec!(11.67));
        assert_eq!(c.cheaper, MealOption::MealPlan);
        assert_eq!(c.per_meal_difference, dec!(1.67));
        assert_eq!(c.monthly_saving, dec!(50.10));
        assert!(result.recommendation.starts_with("Choose meal plan"));
        assert!(result.recommendation.ends_with("frees about 39.17 hours a month"));
    }

    #[test]
    fn test_time_investment_per_month() {
        let result = MealPlanSimulator
            .run(&inputs(dec!(3000), 200, dec!(300)))
            .unwrap();
        let c = comparison(&result);

        // 30 meals at half an hour against 12.5 hours a week of shopping, cooking and cleaning
        assert_eq!(c.plan_hours_monthly, dec!(15.00));
        assert_eq!(c.grocery_hours_monthly, dec!(54.17));
        assert_eq!(c.more_time_efficient, MealOption::MealPlan);
        assert!(result.recommendation.contains("Trade-off: meal plan saves about 39.17 hours"));
    }

    #[test]
    fn test_many_plan_meals_can_cost_more_time() {
        let mut input = inputs(dec!(2000), 200, dec!(3000));
        input.grocery_meals = 120;
        let c = MealPlanSimulator.run(&input).unwrap();
        let c = comparison(&c);

        assert_eq!(c.plan_hours_monthly, dec!(60.00));
        assert_eq!(c.more_time_efficient, MealOption::Groceries);
    }

    #[test]
    fn test_huge_saving_is_invalid_input() {
        let input = MealPlanInputs {
            grocery_meals: 1,
            ..inputs(dec!(0), 1, Decimal::MAX)
        };
        // A single meal keeps the product in range
        assert!(MealPlanSimulator.run(&input).is_ok());

        let input = MealPlanInputs {
            grocery_meals: 2,
            ..inputs(Decimal::MAX, 1, dec!(0))
        };
        assert!(matches!(MealPlanSimulator.run(&input), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_cheaper_groceries_are_recommended() {
        let result = MealPlanSimulator
            .run(&inputs(dec!(3000), 200, dec!(300)))
            .unwrap();
        assert_eq!(comparison(&result).cheaper, MealOption::Groceries);
    }

    #[test]
    fn test_tie_favors_groceries() {
        let result = MealPlanSimulator
            .run(&inputs(dec!(2000), 200, dec!(300)))
            .unwrap();
        let c = comparison(&result);
        assert_eq!(c.cheaper, MealOption::Groceries);
        assert_eq!(c.monthly_saving, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_zero_meals_and_negative_costs() {
        let sim = MealPlanSimulator;
        assert!(matches!(
            sim.run(&inputs(dec!(2000), 0, dec!(300))),
            Err(Error::InvalidInput(_))
        ));
        assert!(sim.run(&inputs(dec!(-1), 10, dec!(300))).is_err());
    }
}
