//! Savings goal command implementations

use anyhow::Result;
use chrono::Utc;
use fincoach_core::db::Database;
use fincoach_core::goals::{goals_summary, GoalStatus};
use rust_decimal::Decimal;

use super::{parse_date, truncate};

pub fn cmd_goals_add(
    db: &Database,
    profile_id: i64,
    description: &str,
    target: Decimal,
    by: &str,
) -> Result<()> {
    db.require_profile(profile_id)?;
    let target_date = parse_date(by, "target")?;
    let id = db.create_goal(profile_id, description, target, target_date)?;

    let today = Utc::now().date_naive();
    let goal = db
        .get_goal(id)?
        .ok_or_else(|| anyhow::anyhow!("Goal {} not found", id))?;

    println!("🎯 Created goal {}: {} (${:.2} by {})", id, description, target, target_date);
    println!(
        "   Save ${:.2}/month for {} months to get there",
        goal.monthly_contribution_needed(today),
        goal.months_remaining(today)
    );
    Ok(())
}

pub fn cmd_goals_list(db: &Database, profile_id: i64) -> Result<()> {
    db.require_profile(profile_id)?;
    let goals = db.list_goals(profile_id)?;

    if goals.is_empty() {
        println!("No goals yet. Add one with:");
        println!(
            "  fincoach goals add --profile {} --description <what> --target <amount> --by YYYY-MM-DD",
            profile_id
        );
        return Ok(());
    }

    let today = Utc::now().date_naive();

    println!();
    println!("🎯 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    for goal in &goals {
        let status = goal.status(today);
        let icon = match status {
            GoalStatus::Completed => "✅",
            GoalStatus::InProgress => "⏳",
            GoalStatus::Overdue => "⚠️ ",
        };
        println!(
            "   {} [{}] {:<28} ${:>9.2} / ${:>9.2}  {:>5}%  by {}",
            icon,
            goal.id,
            truncate(&goal.description, 28),
            goal.current_amount,
            goal.target_amount,
            goal.progress_percent(),
            goal.target_date
        );
        if status == GoalStatus::InProgress {
            println!(
                "        ${:.2}/month needed over {} months",
                goal.monthly_contribution_needed(today),
                goal.months_remaining(today)
            );
        }
    }

    let summary = goals_summary(&goals, today);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Saved ${:.2} of ${:.2} ({}%): {} completed, {} in progress, {} overdue",
        summary.total_saved,
        summary.total_target,
        summary.overall_percent,
        summary.completed,
        summary.in_progress,
        summary.overdue
    );

    Ok(())
}

pub fn cmd_goals_contribute(db: &Database, goal_id: i64, amount: Decimal) -> Result<()> {
    let goal = db.record_contribution(goal_id, amount)?;

    println!(
        "💰 Added ${:.2} to '{}': ${:.2} of ${:.2} ({}%)",
        amount,
        goal.description,
        goal.current_amount,
        goal.target_amount,
        goal.progress_percent()
    );
    if goal.is_complete() {
        println!("🎉 Goal reached!");
    } else {
        println!("   ${:.2} to go", goal.remaining());
    }
    Ok(())
}

pub fn cmd_goals_delete(db: &Database, goal_id: i64) -> Result<()> {
    let goal = db
        .get_goal(goal_id)?
        .ok_or_else(|| anyhow::anyhow!("Goal {} not found", goal_id))?;
    db.delete_goal(goal_id)?;

    println!("🗑️  Deleted goal {}: {}", goal_id, goal.description);
    Ok(())
}
