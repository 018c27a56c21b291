//! Profile command implementations

use anyhow::Result;
use chrono::Utc;
use fincoach_core::db::Database;
use fincoach_core::goals::goals_summary;
use fincoach_core::models::RiskTolerance;
use rust_decimal::Decimal;

use super::truncate;

pub fn cmd_profile_create(
    db: &Database,
    name: &str,
    monthly_income: Decimal,
    risk: RiskTolerance,
) -> Result<()> {
    let id = db.create_profile(name, monthly_income, risk)?;
    println!("✅ Created profile {} ({})", id, name.trim());
    Ok(())
}

pub fn cmd_profile_show(db: &Database, id: i64) -> Result<()> {
    let profile = db.require_profile(id)?;
    let today = Utc::now().date_naive();

    println!();
    println!("👤 {} (profile {})", profile.name, profile.id);
    println!("   ─────────────────────────────");
    println!("   Monthly income:  ${:.2}", profile.monthly_income);
    println!("   Risk tolerance:  {}", profile.risk_tolerance);
    println!("   Transactions:    {}", db.count_transactions(id)?);

    if profile.goals.is_empty() {
        println!("   Goals:           none");
        return Ok(());
    }

    let summary = goals_summary(&profile.goals, today);
    println!(
        "   Goals:           {} (${:.2} of ${:.2}, {}%)",
        profile.goals.len(),
        summary.total_saved,
        summary.total_target,
        summary.overall_percent
    );
    for goal in &profile.goals {
        println!(
            "     [{}] {:<28} {:>5}%  {}",
            goal.id,
            truncate(&goal.description, 28),
            goal.progress_percent(),
            goal.status(today)
        );
    }

    Ok(())
}

pub fn cmd_profile_list(db: &Database) -> Result<()> {
    let profiles = db.list_profiles()?;

    if profiles.is_empty() {
        println!("No profiles yet. Create one with:");
        println!("  fincoach profile create --name <name> --income <monthly>");
        return Ok(());
    }

    println!();
    println!("👥 Profiles");
    println!("   ─────────────────────────────────────────────");
    for profile in profiles {
        println!(
            "   [{}] {:<24} ${:>10.2}/month  {} risk",
            profile.id,
            truncate(&profile.name, 24),
            profile.monthly_income,
            profile.risk_tolerance
        );
    }

    Ok(())
}

pub fn cmd_profile_set_income(db: &Database, id: i64, monthly_income: Decimal) -> Result<()> {
    db.update_monthly_income(id, monthly_income)?;
    println!("✅ Profile {} monthly income set to ${:.2}", id, monthly_income);
    Ok(())
}

pub fn cmd_profile_set_risk(db: &Database, id: i64, risk: RiskTolerance) -> Result<()> {
    db.update_risk_tolerance(id, risk)?;
    println!("✅ Profile {} risk tolerance set to {}", id, risk);
    Ok(())
}
