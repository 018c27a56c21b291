//! Spending analysis command
//!
//! Runs the pattern classifier, the recommendation engine and the budget
//! summary over one window of a profile's transactions.

use anyhow::Result;
use fincoach_core::classifier::{AnalysisWindow, PatternClassifier};
use fincoach_core::db::Database;
use fincoach_core::models::{RecommendationAction, Trend};
use fincoach_core::recommend::RecommendationEngine;
use fincoach_core::{summarize_budget, EngineConfig, IncomeSource};

use super::{format_amount, parse_optional_date};

pub fn cmd_analyze(
    db: &Database,
    config: &EngineConfig,
    profile_id: i64,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let profile = db.require_profile(profile_id)?;
    let from = parse_optional_date(from, "--from")?;
    let to = parse_optional_date(to, "--to")?;

    let transactions = db.list_transactions(profile_id, from, to)?;
    let Some(covering) = AnalysisWindow::covering(&transactions) else {
        println!("No transactions to analyze. Import some with:");
        println!("  fincoach tx import --profile {} --file bank.csv", profile_id);
        return Ok(());
    };
    let window = AnalysisWindow::new(
        from.unwrap_or(covering.start),
        to.unwrap_or(covering.end),
    )?;

    let classifier = PatternClassifier::new(config.classifier.clone())?;
    let engine = RecommendationEngine::new(config.recommendations.clone())?;

    let aggregates = classifier.classify(&transactions, window);
    let recommendations = engine.recommend(&aggregates, &profile)?;
    let budget = summarize_budget(&transactions, window, &profile)?;

    if json {
        let report = serde_json::json!({
            "profile_id": profile_id,
            "window": { "start": window.start, "end": window.end, "periods": window.periods() },
            "aggregates": aggregates,
            "recommendations": recommendations,
            "budget": budget,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "📊 Spending Analysis for {} ({} to {}, {} months)",
        profile.name,
        window.start,
        window.end,
        window.periods()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for agg in &aggregates {
        let trend = match agg.trend {
            Trend::Rising => "📈 rising",
            Trend::Falling => "📉 falling",
            Trend::Stable => "➡️  stable",
        };
        let outlier = if agg.is_outlier { "  ⚠️  outlier" } else { "" };
        println!(
            "   {:<14} {} total  {}/month  {}{}",
            agg.category.to_string(),
            format_amount(agg.total),
            format_amount(agg.average_per_period),
            trend,
            outlier
        );
    }

    println!();
    println!("💡 Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");
    if recommendations.is_empty() {
        println!("   ✅ Nothing stands out. Your spending looks on track!");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let label = match rec.action {
            RecommendationAction::Reduce => "Reduce",
            RecommendationAction::MonitorCap => "Monitor",
            RecommendationAction::ReviewOneTime => "Review",
        };
        println!("   {}. [{}] {}", i + 1, label, rec.rationale);
        if !rec.estimated_monthly_impact.is_zero() {
            println!("      Could save about ${:.2}/month", rec.estimated_monthly_impact);
        }
    }

    println!();
    println!("💵 Budget Summary");
    println!("   ─────────────────────────────────────────────────────────────");
    let source = match budget.income_source {
        IncomeSource::Recorded => "recorded",
        IncomeSource::Profile => "from profile",
    };
    println!("   Income:        ${:.2} ({})", budget.income, source);
    println!("   Expenses:      ${:.2}", budget.expenses);
    println!("   Remaining:     ${:.2}", budget.remaining);
    println!("   Savings rate:  {}%", budget.savings_rate_pct);
    if budget.balanced {
        println!("   ✅ Budget is balanced");
    } else {
        println!("   ⚠️  Spending exceeds income");
    }

    Ok(())
}
