//! Domain models for fincoach

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spending/income category of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tuition,
    Housing,
    Food,
    Transport,
    Entertainment,
    Income,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::Housing => "housing",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Income => "income",
            Self::Other => "other",
        }
    }

    /// All categories in declaration order
    pub fn all() -> &'static [Category] {
        &[
            Self::Tuition,
            Self::Housing,
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Income,
            Self::Other,
        ]
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tuition" | "textbooks" | "school supplies" | "education" => Ok(Self::Tuition),
            "housing" | "rent" | "dorm" | "mortgage" | "utilities" => Ok(Self::Housing),
            "food" | "groceries" | "dining out" | "dining" | "meal plan" => Ok(Self::Food),
            "transport" | "transportation" | "bus" | "gas" | "parking" => Ok(Self::Transport),
            "entertainment" | "streaming" | "movies" | "games" => Ok(Self::Entertainment),
            "income" | "salary" | "work study" | "work-study" | "scholarship" | "financial aid" => {
                Ok(Self::Income)
            }
            "other" | "misc" | "miscellaneous" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded transaction. Expenses are negative, income positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
}

/// A transaction to be inserted (no id yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
    /// Deduplication key for imported rows
    pub import_hash: Option<String>,
}

/// How much risk the user is willing to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" | "medium" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown risk tolerance: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user profile with its goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub monthly_income: Decimal,
    pub goals: Vec<Goal>,
    pub risk_tolerance: RiskTolerance,
}

/// A savings goal. `current_amount` only moves through contribution events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub description: String,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub current_amount: Decimal,
}

/// A single contribution event against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: i64,
    pub goal_id: i64,
    pub amount: Decimal,
    pub contributed_at: DateTime<Utc>,
}

/// Direction of spending between the two most recent periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category summary over an analysis window (derived, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: Category,
    /// Signed sum of the category's transactions
    pub total: Decimal,
    /// `total` divided by the number of calendar months in the window
    pub average_per_period: Decimal,
    pub trend: Trend,
    /// Consecutive most-recent period-over-period increases
    pub rising_streak: usize,
    pub transaction_count: usize,
    /// Calendar months covered by the window
    pub periods: usize,
    /// Per-month totals, oldest first
    pub period_totals: Vec<Decimal>,
    pub is_outlier: bool,
    /// Transactions that triggered the outlier flag
    pub outlier_ids: Vec<i64>,
}

/// What a recommendation asks the user to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    /// Bring spending down to the affordability threshold
    Reduce,
    /// Keep an eye on a rising category and cap it
    MonitorCap,
    /// Look at a one-time expense
    ReviewOneTime,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reduce => "reduce",
            Self::MonitorCap => "monitor_cap",
            Self::ReviewOneTime => "review_one_time",
        }
    }
}

impl std::fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ranked, rule-based suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    pub action: RecommendationAction,
    pub rationale: String,
    pub estimated_monthly_impact: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!("Rent".parse::<Category>().unwrap(), Category::Housing);
        assert_eq!(" groceries ".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("Work Study".parse::<Category>().unwrap(), Category::Income);
        assert!("lottery".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_round_trips_through_as_str() {
        for c in Category::all() {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), *c);
        }
    }

    #[test]
    fn test_risk_tolerance_parse() {
        assert_eq!("medium".parse::<RiskTolerance>().unwrap(), RiskTolerance::Moderate);
        assert_eq!(RiskTolerance::default(), RiskTolerance::Moderate);
    }
}
