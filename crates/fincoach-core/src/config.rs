//! Engine policy configuration
//!
//! Thresholds such as the trend band and the affordability percentages are
//! policy, not physics, so they live in a TOML file rather than in code.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config` on the CLI)
//! 2. An override in the data dir (~/.local/share/fincoach/config/engine.toml)
//! 3. The embedded defaults (compiled into the binary)
//!
//! Every layer is validated before use; an invalid value is a
//! [`Error::Configuration`], never silently corrected.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Category;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

const HOURS_PER_WEEK: u32 = 168;
const MAX_GPA: u32 = 4;

/// Pattern classifier policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Percent change that separates rising/falling from stable
    pub trend_threshold_pct: Decimal,
    /// Multiple of the category mean above which a transaction is an outlier
    pub outlier_multiple: Decimal,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            trend_threshold_pct: Decimal::from(10),
            outlier_multiple: Decimal::from(3),
        }
    }
}

/// Recommendation engine policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Cap on the number of recommendations returned
    pub max_recommendations: usize,
    /// Consecutive rising months needed for a monitor/cap suggestion
    pub rising_streak: usize,
    /// Per-category ceiling as percent of monthly income
    pub affordability_pct: BTreeMap<Category, Decimal>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        let affordability_pct = [
            (Category::Housing, 35),
            (Category::Food, 15),
            (Category::Transport, 10),
            (Category::Tuition, 20),
            (Category::Entertainment, 5),
            (Category::Other, 10),
        ]
        .into_iter()
        .map(|(c, pct)| (c, Decimal::from(pct)))
        .collect();

        Self {
            max_recommendations: 5,
            rising_streak: 2,
            affordability_pct,
        }
    }
}

/// Simulator policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub housing_affordability_pct: Decimal,
    pub housing_timeframe_months: u32,
    pub max_work_hours_per_week: Decimal,
    pub semester_weeks: u32,
    /// Projected GPA drop per 10 weekly work hours
    pub gpa_impact_per_10_hours: Decimal,
    /// Lowest projected GPA a recommended workload may reach
    pub min_viable_gpa: Decimal,
    pub loan_medium_risk_pct: Decimal,
    pub loan_high_risk_pct: Decimal,
    /// Income-based repayment as percent of monthly salary
    pub ibr_income_pct: Decimal,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            housing_affordability_pct: Decimal::from(35),
            housing_timeframe_months: 9,
            max_work_hours_per_week: Decimal::from(20),
            semester_weeks: 15,
            gpa_impact_per_10_hours: Decimal::new(3, 2),
            min_viable_gpa: Decimal::from(3),
            loan_medium_risk_pct: Decimal::from(10),
            loan_high_risk_pct: Decimal::from(15),
            ibr_income_pct: Decimal::from(10),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub recommendations: RecommendationConfig,
    pub simulators: SimulatorConfig,
}

fn invalid(msg: String) -> Error {
    Error::Configuration(msg)
}

fn check_percent(name: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(invalid(format!(
            "{} must be within (0, 100], got {}",
            name, value
        )));
    }
    Ok(())
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trend_threshold_pct.is_sign_negative() {
            return Err(invalid(format!(
                "trend_threshold_pct must not be negative, got {}",
                self.trend_threshold_pct
            )));
        }
        if self.outlier_multiple <= Decimal::ZERO {
            return Err(invalid(format!(
                "outlier_multiple must be positive, got {}",
                self.outlier_multiple
            )));
        }
        Ok(())
    }
}

impl RecommendationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_recommendations == 0 {
            return Err(invalid("max_recommendations must be at least 1".into()));
        }
        if self.rising_streak == 0 {
            return Err(invalid("rising_streak must be at least 1".into()));
        }
        for (category, pct) in &self.affordability_pct {
            if category.is_income() {
                return Err(invalid("income has no affordability threshold".into()));
            }
            check_percent(&format!("affordability_pct.{}", category), *pct)?;
        }
        Ok(())
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<()> {
        check_percent("housing_affordability_pct", self.housing_affordability_pct)?;
        check_percent("loan_medium_risk_pct", self.loan_medium_risk_pct)?;
        check_percent("loan_high_risk_pct", self.loan_high_risk_pct)?;
        check_percent("ibr_income_pct", self.ibr_income_pct)?;
        if self.loan_medium_risk_pct > self.loan_high_risk_pct {
            return Err(invalid(
                "loan_medium_risk_pct must not exceed loan_high_risk_pct".into(),
            ));
        }
        if self.housing_timeframe_months == 0 {
            return Err(invalid("housing_timeframe_months must be at least 1".into()));
        }
        if self.semester_weeks == 0 {
            return Err(invalid("semester_weeks must be at least 1".into()));
        }
        if self.max_work_hours_per_week <= Decimal::ZERO
            || self.max_work_hours_per_week > Decimal::from(HOURS_PER_WEEK)
        {
            return Err(invalid(format!(
                "max_work_hours_per_week must be within (0, {}], got {}",
                HOURS_PER_WEEK, self.max_work_hours_per_week
            )));
        }
        if self.gpa_impact_per_10_hours.is_sign_negative() {
            return Err(invalid(format!(
                "gpa_impact_per_10_hours must not be negative, got {}",
                self.gpa_impact_per_10_hours
            )));
        }
        if self.min_viable_gpa.is_sign_negative() || self.min_viable_gpa > Decimal::from(MAX_GPA) {
            return Err(invalid(format!(
                "min_viable_gpa must be within [0, {}], got {}",
                MAX_GPA, self.min_viable_gpa
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load configuration (explicit path, then data-dir override, then default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                invalid(format!("Failed to read config {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(override_path) => {
                    tracing::debug!(path = %override_path.display(), "Using config override");
                    fs::read_to_string(&override_path)?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = parse_config(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        self.recommendations.validate()?;
        self.simulators.validate()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fincoach").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    classifier: Option<RawClassifier>,
    recommendations: Option<RawRecommendations>,
    simulators: Option<RawSimulators>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    trend_threshold_pct: Option<Decimal>,
    outlier_multiple: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendations {
    max_recommendations: Option<usize>,
    rising_streak: Option<usize>,
    affordability_pct: Option<BTreeMap<Category, Decimal>>,
}

#[derive(Debug, Deserialize)]
struct RawSimulators {
    housing_affordability_pct: Option<Decimal>,
    housing_timeframe_months: Option<u32>,
    max_work_hours_per_week: Option<Decimal>,
    semester_weeks: Option<u32>,
    gpa_impact_per_10_hours: Option<Decimal>,
    min_viable_gpa: Option<Decimal>,
    loan_medium_risk_pct: Option<Decimal>,
    loan_high_risk_pct: Option<Decimal>,
    ibr_income_pct: Option<Decimal>,
}

/// Parse config from TOML content, layering it over the defaults
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = EngineConfig::default();

    if let Some(c) = raw.classifier {
        if let Some(v) = c.trend_threshold_pct {
            config.classifier.trend_threshold_pct = v;
        }
        if let Some(v) = c.outlier_multiple {
            config.classifier.outlier_multiple = v;
        }
    }

    if let Some(r) = raw.recommendations {
        if let Some(v) = r.max_recommendations {
            config.recommendations.max_recommendations = v;
        }
        if let Some(v) = r.rising_streak {
            config.recommendations.rising_streak = v;
        }
        if let Some(thresholds) = r.affordability_pct {
            config.recommendations.affordability_pct.extend(thresholds);
        }
    }

    if let Some(s) = raw.simulators {
        let sim = &mut config.simulators;
        if let Some(v) = s.housing_affordability_pct {
            sim.housing_affordability_pct = v;
        }
        if let Some(v) = s.housing_timeframe_months {
            sim.housing_timeframe_months = v;
        }
        if let Some(v) = s.max_work_hours_per_week {
            sim.max_work_hours_per_week = v;
        }
        if let Some(v) = s.semester_weeks {
            sim.semester_weeks = v;
        }
        if let Some(v) = s.gpa_impact_per_10_hours {
            sim.gpa_impact_per_10_hours = v;
        }
        if let Some(v) = s.min_viable_gpa {
            sim.min_viable_gpa = v;
        }
        if let Some(v) = s.loan_medium_risk_pct {
            sim.loan_medium_risk_pct = v;
        }
        if let Some(v) = s.loan_high_risk_pct {
            sim.loan_high_risk_pct = v;
        }
        if let Some(v) = s.ibr_income_pct {
            sim.ibr_income_pct = v;
        }
    }

    Ok(config)
}
