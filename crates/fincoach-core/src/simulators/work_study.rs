//! Work-study balance: earnings against the hours left for everything else
//!
//! Each workload also carries a projected GPA, lowered by a configured amount
//! per 10 weekly hours and kept within the 0-4 scale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{money, non_negative, Comparison, ScenarioInputs, ScenarioType, SimulationResult, Simulator};
use crate::config::SimulatorConfig;
use crate::error::{ensure, Result};
use crate::numeric::{overflow, round_money};

const HOURS_PER_WEEK: u32 = 168;
const CLASS_HOURS: u32 = 15;
const STUDY_HOURS: u32 = 30;
const SLEEP_HOURS: u32 = 56;
/// Personal time below this many weekly hours triggers a warning
const MIN_PERSONAL_HOURS: u32 = 20;
/// Reference workloads always shown next to the requested one
const STANDARD_HOURS: [u32; 5] = [0, 10, 20, 30, 40];
const MAX_GPA: u32 = 4;

fn default_gpa() -> Decimal {
    Decimal::new(35, 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStudyInputs {
    pub weekly_hours: Decimal,
    pub hourly_wage: Decimal,
    #[serde(default = "default_gpa")]
    pub current_gpa: Decimal,
}

impl WorkStudyInputs {
    /// Inputs for a student at the default 3.5 GPA
    pub fn new(weekly_hours: Decimal, hourly_wage: Decimal) -> Self {
        Self {
            weekly_hours,
            hourly_wage,
            current_gpa: default_gpa(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStudyRow {
    pub weekly_hours: Decimal,
    /// Weekly pay averaged over 52 weeks / 12 months
    pub monthly_earnings: Decimal,
    pub semester_earnings: Decimal,
    /// Weekly hours left after class, study, sleep and work
    pub personal_hours: Decimal,
    pub projected_gpa: Decimal,
    pub exceeds_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStudyComparison {
    pub threshold_hours: Decimal,
    pub requested: WorkStudyRow,
    /// Standard workloads plus the requested one, by hours ascending
    pub rows: Vec<WorkStudyRow>,
    /// Highest-earning viable workload among `rows`
    pub recommended_hours: Decimal,
    pub warnings: Vec<String>,
}

#[derive(Default)]
pub struct WorkStudySimulator {
    config: SimulatorConfig,
}

impl WorkStudySimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn row(&self, hours: Decimal, input: &WorkStudyInputs) -> Result<WorkStudyRow> {
        let weekly = hours
            .checked_mul(input.hourly_wage)
            .ok_or_else(|| overflow("weekly earnings"))?;
        let monthly = weekly
            .checked_mul(Decimal::from(52))
            .map(|yearly| yearly / Decimal::from(12))
            .ok_or_else(|| overflow("monthly earnings"))?;
        let semester = weekly
            .checked_mul(Decimal::from(self.config.semester_weeks))
            .ok_or_else(|| overflow("semester earnings"))?;
        let committed = Decimal::from(HOURS_PER_WEEK - CLASS_HOURS - STUDY_HOURS - SLEEP_HOURS);
        Ok(WorkStudyRow {
            weekly_hours: hours,
            monthly_earnings: round_money(monthly),
            semester_earnings: round_money(semester),
            personal_hours: committed - hours,
            projected_gpa: self.projected_gpa(input.current_gpa, hours),
            exceeds_threshold: hours > self.config.max_work_hours_per_week,
        })
    }

    /// Hours are capped at a week, so this cannot overflow
    fn projected_gpa(&self, current: Decimal, hours: Decimal) -> Decimal {
        let drop = self.config.gpa_impact_per_10_hours * hours / Decimal::TEN;
        (current - drop)
            .clamp(Decimal::ZERO, Decimal::from(MAX_GPA))
            .round_dp(2)
    }

    fn is_viable(&self, row: &WorkStudyRow) -> bool {
        row.projected_gpa >= self.config.min_viable_gpa
            && row.personal_hours >= Decimal::from(MIN_PERSONAL_HOURS)
            && !row.exceeds_threshold
    }

    /// Best earnings among viable rows, else the row that protects GPA most
    fn recommend<'a>(&self, rows: &'a [WorkStudyRow]) -> Option<&'a WorkStudyRow> {
        let viable = rows
            .iter()
            .filter(|r| self.is_viable(r))
            .fold(None, |best: Option<&WorkStudyRow>, r| match best {
                Some(b) if b.semester_earnings >= r.semester_earnings => Some(b),
                _ => Some(r),
            });
        viable.or_else(|| {
            rows.iter().fold(None, |best: Option<&WorkStudyRow>, r| match best {
                Some(b) if b.projected_gpa >= r.projected_gpa => Some(b),
                _ => Some(r),
            })
        })
    }
}

impl Simulator for WorkStudySimulator {
    type Input = WorkStudyInputs;

    fn scenario_type(&self) -> ScenarioType {
        ScenarioType::WorkStudy
    }

    fn run(&self, input: &WorkStudyInputs) -> Result<SimulationResult> {
        non_negative("weekly_hours", input.weekly_hours)?;
        non_negative("hourly_wage", input.hourly_wage)?;
        ensure(input.weekly_hours <= Decimal::from(HOURS_PER_WEEK), || {
            format!(
                "weekly_hours cannot exceed {} (got {})",
                HOURS_PER_WEEK, input.weekly_hours
            )
        })?;
        ensure(
            !input.current_gpa.is_sign_negative() && input.current_gpa <= Decimal::from(MAX_GPA),
            || format!("current_gpa must be within [0, {}] (got {})", MAX_GPA, input.current_gpa),
        )?;

        let threshold = self.config.max_work_hours_per_week;
        let requested = self.row(input.weekly_hours, input)?;

        let mut rows = Vec::with_capacity(STANDARD_HOURS.len() + 1);
        for hours in STANDARD_HOURS {
            rows.push(self.row(Decimal::from(hours), input)?);
        }
        if !rows.iter().any(|r| r.weekly_hours == requested.weekly_hours) {
            rows.push(requested.clone());
            rows.sort_by_key(|r| r.weekly_hours);
        }
        let recommended_hours = self
            .recommend(&rows)
            .map(|r| r.weekly_hours)
            .unwrap_or_default();

        let mut warnings = Vec::new();
        if requested.exceeds_threshold {
            warnings.push(format!(
                "{} hours/week is above the recommended maximum of {}",
                requested.weekly_hours.normalize(),
                threshold.normalize()
            ));
        }
        if requested.personal_hours < Decimal::from(MIN_PERSONAL_HOURS) {
            warnings.push(format!(
                "Only {} personal hours left per week; limited downtime may affect well-being",
                requested.personal_hours.normalize()
            ));
        }
        if requested.projected_gpa < self.config.min_viable_gpa {
            warnings.push(format!(
                "Projected GPA of {} falls below {}",
                requested.projected_gpa,
                self.config.min_viable_gpa.normalize()
            ));
        }

        let mut recommendation = if requested.exceeds_threshold {
            let capped = self.row(threshold, input)?;
            format!(
                "Consider capping work at {} hours/week; that still earns about {}/month",
                threshold.normalize(),
                money(capped.monthly_earnings)
            )
        } else {
            format!(
                "{} hours/week earns about {}/month and stays within the recommended limit",
                requested.weekly_hours.normalize(),
                money(requested.monthly_earnings)
            )
        };
        if recommended_hours != requested.weekly_hours {
            recommendation.push_str(&format!(
                ". The best balance of pay, grades and free time is {} hours/week",
                recommended_hours.normalize()
            ));
        }

        tracing::debug!(
            hours = %requested.weekly_hours,
            warnings = warnings.len(),
            "Work-study simulation complete"
        );

        Ok(SimulationResult::new(
            ScenarioInputs::WorkStudy(input.clone()),
            Comparison::WorkStudy(WorkStudyComparison {
                threshold_hours: threshold,
                requested,
                rows,
                recommended_hours,
                warnings,
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

    fn comparison(result: &SimulationResult) -> &WorkStudyComparison {
        match &result.comparison {
            Comparison::WorkStudy(c) => c,
            other => panic!("unexpected comparison: {:?}", other),
        }
    }

    fn run(hours: Decimal, wage: Decimal) -> SimulationResult {
        WorkStudySimulator::default()
            .run(&WorkStudyInputs::new(hours, wage))
            .unwrap()
    }

    #[test]
    fn test_projects_monthly_earnings() {
        let result = run(dec!(15), dec!(12));
        let c = comparison(&result);

        // 15 * 12 * 52 / 12 = 780
        assert_eq!(c.requested.monthly_earnings, dec!(780.00));
        assert_eq!(c.requested.semester_earnings, dec!(2700.00));
        assert_eq!(c.requested.personal_hours, dec!(52));
        assert!(!c.requested.exceeds_threshold);
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_requested_hours_join_standard_rows() {
        let result = run(dec!(15), dec!(12));
        let c = comparison(&result);
        let hours: Vec<Decimal> = c.rows.iter().map(|r| r.weekly_hours).collect();
        assert_eq!(hours, vec![dec!(0), dec!(10), dec!(15), dec!(20), dec!(30), dec!(40)]);

        let standard = run(dec!(20), dec!(12));
        assert_eq!(comparison(&standard).rows.len(), 5);
    }

    #[test]
    fn test_flags_hours_over_threshold() {
        let result = run(dec!(25), dec!(10));
        let c = comparison(&result);

        assert!(c.requested.exceeds_threshold);
        assert_eq!(c.warnings.len(), 1);
        assert!(result.recommendation.contains("capping work at 20"));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let config = SimulatorConfig {
            max_work_hours_per_week: dec!(30),
            ..SimulatorConfig::default()
        };
        let result = WorkStudySimulator::new(config)
            .unwrap()
            .run(&WorkStudyInputs::new(dec!(25), dec!(10)))
            .unwrap();
        assert!(!comparison(&result).requested.exceeds_threshold);
    }

    #[test]
    fn test_warns_on_little_personal_time() {
        let result = run(dec!(50), dec!(10));
        let c = comparison(&result);
        assert_eq!(c.requested.personal_hours, dec!(17));
        assert_eq!(c.warnings.len(), 2);
    }

    #[test]
    fn test_rejects_impossible_hours() {
        let sim = WorkStudySimulator::default();
        let too_many = WorkStudyInputs::new(dec!(200), dec!(10));
        assert!(matches!(sim.run(&too_many), Err(Error::InvalidInput(_))));

        let negative_wage = WorkStudyInputs::new(dec!(10), dec!(-1));
        assert!(sim.run(&negative_wage).is_err());

        let bad_gpa = WorkStudyInputs {
            current_gpa: dec!(4.5),
            ..WorkStudyInputs::new(dec!(10), dec!(10))
        };
        assert!(matches!(sim.run(&bad_gpa), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_huge_wage_is_invalid_input() {
        let sim = WorkStudySimulator::default();
        let inputs = WorkStudyInputs::new(dec!(40), Decimal::MAX / dec!(10));
        assert!(matches!(sim.run(&inputs), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_projects_gpa_per_workload() {
        let result = run(dec!(15), dec!(12));
        let c = comparison(&result);

        // 3.5 - 0.03 * 15 / 10
        assert_eq!(c.requested.projected_gpa, dec!(3.46));
        let gpas: Vec<Decimal> = c.rows.iter().map(|r| r.projected_gpa).collect();
        assert_eq!(gpas, vec![dec!(3.5), dec!(3.47), dec!(3.46), dec!(3.44), dec!(3.41), dec!(3.38)]);
    }

    #[test]
    fn test_projected_gpa_stays_on_scale() {
        let config = SimulatorConfig {
            gpa_impact_per_10_hours: dec!(1),
            ..SimulatorConfig::default()
        };
        let result = WorkStudySimulator::new(config)
            .unwrap()
            .run(&WorkStudyInputs::new(dec!(60), dec!(10)))
            .unwrap();
        let c = comparison(&result);

        assert_eq!(c.requested.projected_gpa, Decimal::ZERO);
        assert!(c.warnings.iter().any(|w| w.contains("Projected GPA")));
    }

    #[test]
    fn test_recommends_highest_earning_viable_workload() {
        // 30 and 40 hours earn more but exceed the 20 hour limit
        let result = run(dec!(15), dec!(12));
        let c = comparison(&result);
        assert_eq!(c.recommended_hours, dec!(20));
        assert!(result.recommendation.contains("best balance of pay, grades and free time is 20"));

        // A weak GPA makes every workload unviable, so the GPA wins
        let sim = WorkStudySimulator::default();
        let struggling = WorkStudyInputs {
            current_gpa: dec!(2.5),
            ..WorkStudyInputs::new(dec!(10), dec!(12))
        };
        let result = sim.run(&struggling).unwrap();
        assert_eq!(comparison(&result).recommended_hours, dec!(0));
    }

    #[test]
    fn test_gpa_threshold_limits_recommendation() {
        // 3.1 - 0.1 * h / 10 drops below 3.0 after 10 hours
        let config = SimulatorConfig {
            gpa_impact_per_10_hours: dec!(0.1),
            ..SimulatorConfig::default()
        };
        let inputs = WorkStudyInputs {
            current_gpa: dec!(3.1),
            ..WorkStudyInputs::new(dec!(20), dec!(12))
        };
        let result = WorkStudySimulator::new(config).unwrap().run(&inputs).unwrap();
        let c = comparison(&result);

        assert_eq!(c.requested.projected_gpa, dec!(2.9));
        assert_eq!(c.recommended_hours, dec!(10));
        assert!(c.warnings.iter().any(|w| w.contains("below 3")));
    }
}
