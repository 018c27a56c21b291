//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fincoach_core::models::{Category, RiskTolerance};
use rust_decimal::Decimal;

/// Fincoach - Budget analysis and what-if simulations for students
#[derive(Parser)]
#[command(name = "fincoach")]
#[command(about = "Student budget analysis and financial simulation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fincoach.db", global = true)]
    pub db: PathBuf,

    /// Engine policy file (defaults to the data-dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage student profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Record, list and import transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: GoalsAction,
    },

    /// Analyze spending: category patterns, recommendations and budget summary
    Analyze {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,

        /// Start date (YYYY-MM-DD); defaults to the earliest transaction
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD); defaults to the latest transaction
        #[arg(long)]
        to: Option<String>,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Run a what-if simulation
    Simulate {
        #[command(subcommand)]
        scenario: SimulateAction,
    },

    /// Browse saved simulation runs
    Simulations {
        #[command(subcommand)]
        action: SimulationsAction,
    },

    /// Look up financial terms
    Terms {
        /// Terms file to use instead of the built-in knowledge base
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        action: TermsAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a profile
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Monthly income
        #[arg(short, long, default_value = "0")]
        income: Decimal,

        /// Risk tolerance: low, moderate, high
        #[arg(short, long, default_value = "moderate")]
        risk: RiskTolerance,
    },

    /// Show a profile with its goals
    Show {
        /// Profile ID
        id: i64,
    },

    /// List profiles
    List,

    /// Change a profile's monthly income
    SetIncome {
        /// Profile ID
        id: i64,

        /// New monthly income
        income: Decimal,
    },

    /// Change a profile's risk tolerance
    SetRisk {
        /// Profile ID
        id: i64,

        /// Risk tolerance: low, moderate, high
        risk: RiskTolerance,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Record a single transaction
    Add {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,

        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Amount; expenses are negative
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Decimal,

        /// Category (e.g. rent, groceries, tuition, salary)
        #[arg(short, long)]
        category: Category,

        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List transactions
    List {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Import transactions from a CSV file (date,amount,category,note)
    Import {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// Add a savings goal
    Add {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,

        /// What the goal is for
        #[arg(short, long)]
        description: String,

        /// Amount to save
        #[arg(short, long)]
        target: Decimal,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: String,
    },

    /// List a profile's goals with progress
    List {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,
    },

    /// Record a contribution towards a goal
    Contribute {
        /// Goal ID
        id: i64,

        /// Amount contributed
        amount: Decimal,
    },

    /// Delete a goal and its contribution history
    Delete {
        /// Goal ID
        id: i64,
    },
}

/// Options shared by every simulation
#[derive(Args)]
pub struct RunOptions {
    /// Save the result to the profile's history
    #[arg(long, requires = "profile")]
    pub save: bool,

    /// Profile to save the result under
    #[arg(short, long)]
    pub profile: Option<i64>,

    /// Print JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum SimulateAction {
    /// Compare housing options
    Housing {
        /// Option as NAME:RENT:UTILITIES:COMMUTE (repeatable)
        #[arg(short = 'o', long = "option", required = true)]
        options: Vec<String>,

        /// Monthly income, to flag unaffordable options
        #[arg(long)]
        income: Option<Decimal>,

        /// Months to project over (defaults to the academic year)
        #[arg(long)]
        months: Option<u32>,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Compare a meal plan against groceries
    MealPlan {
        /// Meal plan cost for the term
        #[arg(long)]
        plan_cost: Decimal,

        /// Meals the plan covers
        #[arg(long)]
        plan_meals: u32,

        /// Monthly grocery spending
        #[arg(long)]
        grocery_monthly: Decimal,

        /// Meals groceries cover each month
        #[arg(long, default_value = "30")]
        grocery_meals: u32,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Project work-study earnings and time left over
    WorkStudy {
        /// Weekly hours
        #[arg(long)]
        hours: Decimal,

        /// Hourly wage
        #[arg(long)]
        wage: Decimal,

        /// Current GPA on a 4.0 scale
        #[arg(long, default_value = "3.5")]
        gpa: Decimal,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Compare loan repayment with and without extra payments
    Loan {
        /// Amount borrowed
        #[arg(long)]
        principal: Decimal,

        /// Annual interest rate in percent (e.g. 5.5)
        #[arg(long)]
        rate: Decimal,

        /// Term in months
        #[arg(long)]
        term_months: u32,

        /// Extra principal paid each month
        #[arg(long, default_value = "0")]
        extra: Decimal,

        /// Expected annual salary, for the affordability check
        #[arg(long)]
        salary: Option<Decimal>,

        #[command(flatten)]
        run: RunOptions,
    },
}

#[derive(Subcommand)]
pub enum SimulationsAction {
    /// List a profile's saved runs, newest first
    List {
        /// Profile ID
        #[arg(short, long)]
        profile: i64,
    },

    /// Show a saved run
    Show {
        /// Simulation ID
        id: i64,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Run a saved scenario again with the current policy and save the new result
    Rerun {
        /// Simulation ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TermsAction {
    /// Show a term's definition and advice
    Show {
        /// Term name or alias
        name: String,
    },

    /// Find terms whose name or alias contains a keyword
    Search {
        keyword: String,
    },

    /// List categories, or the terms in one category
    Category {
        name: Option<String>,
    },

    /// Terms mentioned in a term's description
    Related {
        /// Term name or alias
        name: String,
    },

    /// Ask a question in plain words, e.g. "how do I build credit?"
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}
