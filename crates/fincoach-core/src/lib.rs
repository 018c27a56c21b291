//! Fincoach Core Library
//!
//! Budget analysis and financial simulation for students:
//! - Fixed-point numeric core (interest, present/future value, amortization)
//! - Spending pattern classifier over calendar-month periods
//! - Rule-based recommendation engine
//! - Housing, meal plan, work-study and loan simulators
//! - Savings goals and budget summaries
//! - Financial terms knowledge base
//! - CSV import and SQLite persistence

pub mod budget;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod goals;
pub mod import;
pub mod knowledge;
pub mod models;
pub mod numeric;
pub mod recommend;
pub mod simulators;

/// Fixture builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use budget::{summarize_budget, BudgetSummary, IncomeSource};
pub use classifier::{AnalysisWindow, PatternClassifier};
pub use config::{ClassifierConfig, EngineConfig, RecommendationConfig, SimulatorConfig};
pub use db::{Database, ImportSummary, StoredSimulation, TransactionInsertResult};
pub use error::{Error, Result};
pub use goals::{goals_summary, GoalStatus, GoalsSummary};
pub use import::parse_csv;
pub use knowledge::{Answer, FinancialTerm, KnowledgeBase, QuestionKind};
pub use models::*;
pub use recommend::{RecommendationEngine, RuleId};
pub use simulators::{run_scenario, Comparison, ScenarioInputs, ScenarioType, SimulationResult, Simulator};
