//! Housing cost comparison

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, non_negative, Comparison, ScenarioInputs, ScenarioType, SimulationResult, Simulator};
use crate::config::SimulatorConfig;
use crate::error::{ensure, Error, Result};
use crate::numeric::{overflow, round_money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingOption {
    pub name: String,
    pub rent: Decimal,
    pub utilities: Decimal,
    pub commute_cost: Decimal,
}

impl HousingOption {
    pub fn new(name: impl Into<String>, rent: Decimal, utilities: Decimal, commute_cost: Decimal) -> Self {
        Self {
            name: name.into(),
            rent,
            utilities,
            commute_cost,
        }
    }

    pub fn monthly_total(&self) -> Result<Decimal> {
        self.rent
            .checked_add(self.utilities)
            .and_then(|v| v.checked_add(self.commute_cost))
            .ok_or_else(|| overflow(&format!("{} monthly cost", self.name)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingInputs {
    pub options: Vec<HousingOption>,
    /// Without an income no option is flagged as unaffordable
    #[serde(default)]
    pub monthly_income: Option<Decimal>,
    /// Months to project over; defaults to the configured academic year
    #[serde(default)]
    pub timeframe_months: Option<u32>,
}

/// One option in the ranked table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRow {
    pub rank: usize,
    pub name: String,
    pub monthly_total: Decimal,
    pub timeframe_total: Decimal,
    /// Monthly cost as percent of income, when income is known
    pub income_share_pct: Option<Decimal>,
    pub exceeds_affordability: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingComparison {
    pub timeframe_months: u32,
    /// Monthly ceiling implied by the affordability rule, when income is known
    pub affordability_limit: Option<Decimal>,
    /// Cheapest first
    pub rows: Vec<HousingRow>,
    /// Most expensive minus cheapest over the timeframe
    pub savings_potential: Decimal,
    pub recommended: String,
}

#[derive(Default)]
pub struct HousingSimulator {
    config: SimulatorConfig,
}

impl HousingSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn validate(&self, input: &HousingInputs) -> Result<()> {
        if input.options.is_empty() {
            return Err(Error::InsufficientData(
                "housing comparison needs at least one option".into(),
            ));
        }
        for option in &input.options {
            non_negative(&format!("{} rent", option.name), option.rent)?;
            non_negative(&format!("{} utilities", option.name), option.utilities)?;
            non_negative(&format!("{} commute cost", option.name), option.commute_cost)?;
        }
        if let Some(income) = input.monthly_income {
            ensure(income > Decimal::ZERO, || {
                format!("monthly_income must be positive (got {})", income)
            })?;
        }
        ensure(input.timeframe_months != Some(0), || {
            "timeframe_months must be at least 1".to_string()
        })
    }
}

impl Simulator for HousingSimulator {
    type Input = HousingInputs;

    fn scenario_type(&self) -> ScenarioType {
        ScenarioType::Housing
    }

    fn run(&self, input: &HousingInputs) -> Result<SimulationResult> {
        self.validate(input)?;

        let timeframe = input
            .timeframe_months
            .unwrap_or(self.config.housing_timeframe_months);
        let pct = self.config.housing_affordability_pct;
        let limit = input
            .monthly_income
            .map(|income| {
                income
                    .checked_mul(pct / Decimal::ONE_HUNDRED)
                    .map(round_money)
                    .ok_or_else(|| overflow("affordability limit"))
            })
            .transpose()?;

        let mut priced = Vec::with_capacity(input.options.len());
        for option in &input.options {
            priced.push((option.monthly_total()?, option));
        }
        // Stable sort keeps input order between equally priced options
        priced.sort_by_key(|(total, _)| *total);

        let mut rows = Vec::with_capacity(priced.len());
        for (i, (monthly_total, option)) in priced.into_iter().enumerate() {
            let timeframe_total = monthly_total
                .checked_mul(Decimal::from(timeframe))
                .ok_or_else(|| overflow(&format!("{} cost over {} months", option.name, timeframe)))?;
            let income_share_pct = input
                .monthly_income
                .map(|income| {
                    monthly_total
                        .checked_div(income)
                        .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
                        .map(round_money)
                        .ok_or_else(|| overflow("income share"))
                })
                .transpose()?;
            rows.push(HousingRow {
                rank: i + 1,
                name: option.name.clone(),
                monthly_total,
                timeframe_total,
                income_share_pct,
                exceeds_affordability: limit.is_some_and(|l| monthly_total > l),
            });
        }

        let cheapest = &rows[0];
        let priciest = &rows[rows.len() - 1];
        let savings_potential = priciest.timeframe_total - cheapest.timeframe_total;

        let (recommended, recommendation) = match rows.iter().find(|r| !r.exceeds_affordability) {
            Some(best) => {
                let mut text = format!(
                    "{} is the lowest-cost option that fits your budget at {}/month",
                    best.name,
                    money(best.monthly_total)
                );
                if savings_potential > Decimal::ZERO && best.rank == 1 {
                    text.push_str(&format!(
                        ", saving {} over {} months versus {}",
                        money(savings_potential),
                        timeframe,
                        priciest.name
                    ));
                }
                (best.name.clone(), text)
            }
            None => (
                cheapest.name.clone(),
                format!(
                    "Every option exceeds {}% of your income; {} is the least expensive at {}/month",
                    pct.normalize(),
                    cheapest.name,
                    money(cheapest.monthly_total)
                ),
            ),
        };

        tracing::debug!(
            options = rows.len(),
            timeframe,
            recommended = %recommended,
            "Housing comparison complete"
        );

        Ok(SimulationResult::new(
            ScenarioInputs::Housing(input.clone()),
            Comparison::Housing(HousingComparison {
                timeframe_months: timeframe,
                affordability_limit: limit,
                rows,
                savings_potential,
                recommended,
            }),
            recommendation,
        ))
    }
}
