//! Recommendation Engine
//!
//! Evaluates a fixed, ordered rule table against each category aggregate.
//! The first rule that fires for a category wins; categories where nothing
//! fires contribute nothing. Results are ranked by estimated monthly impact
//! (highest first) and capped at the configured maximum, dropping the
//! lowest-impact items.
//!
//! Rules are plain functions in a static table keyed by [`RuleId`], so adding
//! a rule is one function and one table row.

use rust_decimal::Decimal;

use crate::classifier::spending;
use crate::config::RecommendationConfig;
use crate::error::{Error, Result};
use crate::models::{
    CategoryAggregate, Recommendation, RecommendationAction, Trend, UserProfile,
};
use crate::numeric::round_money;

/// Identifies a rule in the evaluation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleId {
    /// Category spending above its share-of-income ceiling
    Affordability,
    /// Spending rising for several consecutive months
    RisingTrend,
    /// A one-time outlier transaction
    OneTimeOutlier,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Affordability => "affordability",
            Self::RisingTrend => "rising_trend",
            Self::OneTimeOutlier => "one_time_outlier",
        }
    }
}

/// Everything a rule may look at
struct RuleContext<'a> {
    aggregate: &'a CategoryAggregate,
    profile: &'a UserProfile,
    config: &'a RecommendationConfig,
}

type RuleFn = fn(&RuleContext<'_>) -> Option<Recommendation>;

/// Evaluation order matters: first match per category wins
const RULES: &[(RuleId, RuleFn)] = &[
    (RuleId::Affordability, affordability_rule),
    (RuleId::RisingTrend, rising_trend_rule),
    (RuleId::OneTimeOutlier, outlier_rule),
];

fn affordability_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let income = ctx.profile.monthly_income;
    if income <= Decimal::ZERO {
        return None;
    }
    let pct = *ctx.config.affordability_pct.get(&ctx.aggregate.category)?;

    let ceiling = round_money(income * pct / Decimal::ONE_HUNDRED);
    let monthly = spending(ctx.aggregate.average_per_period);
    if monthly <= ceiling {
        return None;
    }

    let share = monthly / income * Decimal::ONE_HUNDRED;
    Some(Recommendation {
        category: ctx.aggregate.category,
        action: RecommendationAction::Reduce,
        rationale: format!(
            "{} averages ${:.2}/month, {:.1}% of income, above the {}% ceiling of ${:.2}",
            ctx.aggregate.category, monthly, share, pct, ceiling
        ),
        estimated_monthly_impact: monthly - ceiling,
    })
}

fn rising_trend_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let agg = ctx.aggregate;
    if agg.trend != Trend::Rising || agg.rising_streak < ctx.config.rising_streak {
        return None;
    }

    // Impact is the most recent month-over-month increase
    let n = agg.period_totals.len();
    let increase = match n {
        0 | 1 => Decimal::ZERO,
        _ => spending(agg.period_totals[n - 1]) - spending(agg.period_totals[n - 2]),
    };

    Some(Recommendation {
        category: agg.category,
        action: RecommendationAction::MonitorCap,
        rationale: format!(
            "{} spending has risen {} months in a row; cap it at last month's level",
            agg.category, agg.rising_streak
        ),
        estimated_monthly_impact: round_money(increase.max(Decimal::ZERO)),
    })
}

fn outlier_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let agg = ctx.aggregate;
    if !agg.is_outlier {
        return None;
    }

    Some(Recommendation {
        category: agg.category,
        action: RecommendationAction::ReviewOneTime,
        rationale: format!(
            "{} has {} unusually large transaction(s) worth reviewing",
            agg.category,
            agg.outlier_ids.len()
        ),
        estimated_monthly_impact: Decimal::ZERO,
    })
}

/// Produces ranked recommendations from aggregates and a profile
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            config: RecommendationConfig::default(),
        }
    }
}

impl RecommendationEngine {
    /// Create an engine, rejecting an invalid configuration
    pub fn new(config: RecommendationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rule identifiers in evaluation order
    pub fn rules(&self) -> Vec<RuleId> {
        RULES.iter().map(|(id, _)| *id).collect()
    }

    /// Evaluate the rule table and return the ranked, capped list
    pub fn recommend(
        &self,
        aggregates: &[CategoryAggregate],
        profile: &UserProfile,
    ) -> Result<Vec<Recommendation>> {
        if profile.monthly_income.is_sign_negative() {
            return Err(Error::InvalidInput(format!(
                "monthly_income must not be negative (got {})",
                profile.monthly_income
            )));
        }

        let mut recommendations = Vec::new();

        for aggregate in aggregates {
            let ctx = RuleContext {
                aggregate,
                profile,
                config: &self.config,
            };

            let fired = RULES
                .iter()
                .find_map(|(id, rule)| rule(&ctx).map(|rec| (*id, rec)));

            if let Some((rule, rec)) = fired {
                tracing::debug!(
                    category = %aggregate.category,
                    rule = rule.as_str(),
                    impact = %rec.estimated_monthly_impact,
                    "Rule fired"
                );
                recommendations.push(rec);
            }
        }

        // Stable sort keeps category order among equal impacts
        recommendations.sort_by(|a, b| b.estimated_monthly_impact.cmp(&a.estimated_monthly_impact));

        let max = self.config.max_recommendations;
        if recommendations.len() > max {
            tracing::debug!(
                dropped = recommendations.len() - max,
                "Truncated lowest-impact recommendations"
            );
            recommendations.truncate(max);
        }

        Ok(recommendations)
    }
}
