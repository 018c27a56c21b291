//! Simulation command implementations
//!
//! This module contains:
//! - `scenario_inputs` - Turn parsed arguments into simulator inputs
//! - `cmd_simulate` - Run a scenario, optionally saving it
//! - `cmd_simulations_*` - Browse and re-run saved results

use anyhow::{Context, Result};
use fincoach_core::db::Database;
use fincoach_core::simulators::{
    run_scenario, Comparison, HousingInputs, HousingOption, LoanInputs, MealPlanInputs,
    ScenarioInputs, SimulationResult, WorkStudyInputs,
};
use fincoach_core::EngineConfig;
use rust_decimal::Decimal;

use crate::cli::{RunOptions, SimulateAction};

/// Parse `NAME:RENT:UTILITIES:COMMUTE`; utilities and commute default to 0
pub fn parse_housing_option(value: &str) -> Result<HousingOption> {
    let parts: Vec<&str> = value.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 4 || parts[0].is_empty() {
        anyhow::bail!(
            "Invalid housing option '{}' (use NAME:RENT[:UTILITIES[:COMMUTE]])",
            value
        );
    }

    let amount = |i: usize, what: &str| -> Result<Decimal> {
        match parts.get(i) {
            Some(s) if !s.is_empty() => s
                .parse()
                .with_context(|| format!("Invalid {} '{}' in housing option '{}'", what, s, value)),
            _ => Ok(Decimal::ZERO),
        }
    };

    Ok(HousingOption::new(
        parts[0],
        amount(1, "rent")?,
        amount(2, "utilities")?,
        amount(3, "commute cost")?,
    ))
}

/// Split a `simulate` subcommand into simulator inputs and run options
pub fn scenario_inputs(action: SimulateAction) -> Result<(ScenarioInputs, RunOptions)> {
    let pair = match action {
        SimulateAction::Housing {
            options,
            income,
            months,
            run,
        } => {
            let options = options
                .iter()
                .map(|s| parse_housing_option(s))
                .collect::<Result<Vec<_>>>()?;
            let inputs = ScenarioInputs::Housing(HousingInputs {
                options,
                monthly_income: income,
                timeframe_months: months,
            });
            (inputs, run)
        }
        SimulateAction::MealPlan {
            plan_cost,
            plan_meals,
            grocery_monthly,
            grocery_meals,
            run,
        } => {
            let inputs = ScenarioInputs::MealPlan(MealPlanInputs {
                plan_cost,
                plan_meals,
                grocery_monthly,
                grocery_meals,
            });
            (inputs, run)
        }
        SimulateAction::WorkStudy { hours, wage, gpa, run } => {
            let inputs = ScenarioInputs::WorkStudy(WorkStudyInputs {
                weekly_hours: hours,
                hourly_wage: wage,
                current_gpa: gpa,
            });
            (inputs, run)
        }
        SimulateAction::Loan {
            principal,
            rate,
            term_months,
            extra,
            salary,
            run,
        } => {
            let inputs = ScenarioInputs::LoanRepayment(LoanInputs {
                principal,
                // Entered as a percent
                annual_rate: rate / Decimal::ONE_HUNDRED,
                term_months,
                extra_monthly_payment: extra,
                annual_salary: salary,
            });
            (inputs, run)
        }
    };
    Ok(pair)
}

/// Run a scenario and print it; with `save_to`, also store it under that profile
pub fn cmd_simulate(
    db: Option<&Database>,
    config: &EngineConfig,
    inputs: &ScenarioInputs,
    save_to: Option<i64>,
    json: bool,
) -> Result<()> {
    let target = match (db, save_to) {
        (Some(db), Some(profile_id)) => {
            db.require_profile(profile_id)?;
            Some((db, profile_id))
        }
        _ => None,
    };

    let result = run_scenario(&config.simulators, inputs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if let Some((db, profile_id)) = target {
        let id = db.save_simulation(profile_id, &result)?;
        if !json {
            println!();
            println!("💾 Saved as simulation {}", id);
        }
    }

    Ok(())
}

pub fn cmd_simulations_list(db: &Database, profile_id: i64) -> Result<()> {
    db.require_profile(profile_id)?;
    let runs = db.list_simulations(profile_id)?;

    if runs.is_empty() {
        println!("No saved simulations. Run one with --save --profile {}.", profile_id);
        return Ok(());
    }

    println!();
    println!("🧪 Saved Simulations");
    println!("   ─────────────────────────────────────────────────────────────");
    for run in runs {
        println!(
            "   [{}] {} │ {:<14} │ {}",
            run.id,
            run.created_at.format("%Y-%m-%d %H:%M"),
            run.scenario_type.to_string(),
            super::truncate(&run.result.recommendation, 60)
        );
    }

    Ok(())
}

pub fn cmd_simulations_show(db: &Database, id: i64, json: bool) -> Result<()> {
    let stored = db
        .get_simulation(id)?
        .ok_or_else(|| anyhow::anyhow!("Simulation {} not found", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }

    println!(
        "Simulation {} for profile {}, run {}",
        stored.id,
        stored.profile_id,
        stored.created_at.format("%Y-%m-%d %H:%M")
    );
    print_result(&stored.result);
    Ok(())
}

/// Run a stored scenario again; the stored run is left untouched
pub fn cmd_simulations_rerun(db: &Database, config: &EngineConfig, id: i64) -> Result<()> {
    let stored = db
        .get_simulation(id)?
        .ok_or_else(|| anyhow::anyhow!("Simulation {} not found", id))?;

    let result = run_scenario(&config.simulators, &stored.result.inputs)?;
    print_result(&result);

    let new_id = db.save_simulation(stored.profile_id, &result)?;
    println!();
    if result == stored.result {
        println!("💾 Saved as simulation {} (same outcome as {})", new_id, id);
    } else {
        println!("💾 Saved as simulation {} (outcome changed since {})", new_id, id);
    }
    Ok(())
}

fn print_result(result: &SimulationResult) {
    println!();
    match &result.comparison {
        Comparison::Housing(c) => {
            println!("🏠 Housing Comparison ({} months)", c.timeframe_months);
            println!("   ─────────────────────────────────────────────────────────────");
            for row in &c.rows {
                let share = row
                    .income_share_pct
                    .map(|pct| format!("{}% of income", pct))
                    .unwrap_or_default();
                let flag = if row.exceeds_affordability { " ⚠️" } else { "" };
                println!(
                    "   {}. {:<22} ${:>8.2}/month  ${:>10.2} total  {}{}",
                    row.rank,
                    super::truncate(&row.name, 22),
                    row.monthly_total,
                    row.timeframe_total,
                    share,
                    flag
                );
            }
            if let Some(limit) = c.affordability_limit {
                println!("   Affordable up to ${:.2}/month", limit);
            }
            println!("   Savings potential: ${:.2}", c.savings_potential);
        }
        Comparison::MealPlan(c) => {
            println!("🍽️  Meal Plan vs Groceries");
            println!("   ─────────────────────────────────────────────────────────────");
            println!("   Meal plan:  ${:.2}/meal", c.plan_cost_per_meal);
            println!("   Groceries:  ${:.2}/meal", c.grocery_cost_per_meal);
            println!("   Difference: ${:.2}/meal", c.per_meal_difference);
            println!("   Monthly saving with {}: ${:.2}", c.cheaper, c.monthly_saving);
            println!(
                "   Time per month: {} hours on the plan, {} hours cooking",
                c.plan_hours_monthly, c.grocery_hours_monthly
            );
        }
        Comparison::WorkStudy(c) => {
            println!("💼 Work-Study Projection (threshold {} hours/week)", c.threshold_hours);
            println!("   ─────────────────────────────────────────────────────────────");
            println!("   Hours/week   Monthly    Semester   Personal hours   GPA");
            for row in &c.rows {
                let marker = if row == &c.requested { "▶" } else { " " };
                let flag = if row.exceeds_threshold { " ⚠️" } else { "" };
                let best = if row.weekly_hours == c.recommended_hours { " ★" } else { "" };
                println!(
                    "  {} {:>9}  ${:>8.2}  ${:>9.2}  {:>14}  {:>5.2}{}{}",
                    marker,
                    row.weekly_hours,
                    row.monthly_earnings,
                    row.semester_earnings,
                    row.personal_hours,
                    row.projected_gpa,
                    best,
                    flag
                );
            }
            for warning in &c.warnings {
                println!("   ⚠️  {}", warning);
            }
        }
        Comparison::LoanRepayment(c) => {
            println!("🎓 Loan Repayment");
            println!("   ─────────────────────────────────────────────────────────────");
            println!(
                "   Standard:  ${:.2}/month for {} months, ${:.2} interest",
                c.baseline.monthly_payment,
                c.baseline.summary.periods,
                c.baseline.summary.total_interest
            );
            if let Some(fast) = &c.accelerated {
                println!(
                    "   With extra: ${:.2}/month for {} months, ${:.2} interest",
                    fast.monthly_payment, fast.summary.periods, fast.summary.total_interest
                );
                println!(
                    "   Saves {} months and ${:.2} in interest",
                    c.months_saved, c.interest_saved
                );
            }
            if let Some(a) = &c.affordability {
                println!(
                    "   Payments are {}% of expected income ({} risk)",
                    a.payment_to_income_pct, a.risk
                );
            }
            if let Some(plan) = &c.income_based {
                match (plan.estimated_months, plan.total_repaid) {
                    (Some(months), Some(total)) => println!(
                        "   Income-based: ${:.2}/month for {} months, ${:.2} repaid",
                        plan.monthly_payment, months, total
                    ),
                    _ => println!(
                        "   Income-based: ${:.2}/month, will not fully repay",
                        plan.monthly_payment
                    ),
                }
            }
            if let Some(ratio) = c.loan_to_income_ratio {
                println!("   Loan-to-income ratio: {}", ratio);
            }
        }
    }
    println!();
    println!("💡 {}", result.recommendation);
}
