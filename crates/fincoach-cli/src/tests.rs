//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::{CommandFactory, Parser};
use fincoach_core::db::Database;
use fincoach_core::knowledge::KnowledgeBase;
use fincoach_core::models::{Category, RiskTolerance};
use fincoach_core::simulators::{ScenarioInputs, ScenarioType, WorkStudyInputs};
use fincoach_core::test_utils::date;
use fincoach_core::EngineConfig;
use rust_decimal_macros::dec;

use crate::cli::{Cli, Commands, GoalsAction, SimulateAction, TermsAction};
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn create_test_profile(db: &Database) -> i64 {
    db.create_profile("Test Student", dec!(2000), RiskTolerance::Moderate)
        .unwrap()
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const SAMPLE_CSV: &str = "date,amount,category,note
2024-01-01,2000,salary,
2024-01-02,-900,rent,
2024-01-10,-200,groceries,
2024-02-01,2000,salary,
2024-02-02,-900,rent,
2024-02-10,-260,groceries,
";

fn config() -> EngineConfig {
    EngineConfig::embedded().unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_tx_add_accepts_negative_amount() {
    let cli = Cli::try_parse_from([
        "fincoach", "tx", "add", "--profile", "1", "--date", "2024-01-05", "--amount", "-12.50",
        "--category", "groceries",
    ])
    .unwrap();

    match cli.command {
        Commands::Tx {
            action: crate::cli::TxAction::Add {
                amount, category, ..
            },
        } => {
            assert_eq!(amount, dec!(-12.50));
            assert_eq!(category, Category::Food);
        }
        _ => panic!("expected tx add"),
    }
}

#[test]
fn test_save_requires_profile() {
    let result = Cli::try_parse_from([
        "fincoach", "simulate", "work-study", "--hours", "15", "--wage", "12", "--save",
    ]);
    assert!(result.is_err());

    let result = Cli::try_parse_from([
        "fincoach", "simulate", "work-study", "--hours", "15", "--wage", "12", "--save",
        "--profile", "1",
    ]);
    assert!(result.is_ok());
}

#[test]
fn test_work_study_gpa_defaults_and_parses() {
    let parse = |extra: &[&str]| {
        let mut args = vec!["fincoach", "simulate", "work-study", "--hours", "15", "--wage", "12"];
        args.extend_from_slice(extra);
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Simulate {
                scenario: SimulateAction::WorkStudy { gpa, .. },
            } => gpa,
            _ => panic!("expected simulate work-study"),
        }
    };
    assert_eq!(parse(&[]), dec!(3.5));
    assert_eq!(parse(&["--gpa", "2.8"]), dec!(2.8));
}

#[test]
fn test_terms_ask_joins_words() {
    let cli = Cli::try_parse_from(["fincoach", "terms", "ask", "what", "is", "a", "budget?"]).unwrap();
    match cli.command {
        Commands::Terms {
            action: TermsAction::Ask { question },
            ..
        } => assert_eq!(question.join(" "), "what is a budget?"),
        _ => panic!("expected terms ask"),
    }

    assert!(Cli::try_parse_from(["fincoach", "terms", "ask"]).is_err());
}

#[test]
fn test_goals_delete_parses() {
    let cli = Cli::try_parse_from(["fincoach", "goals", "delete", "7"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Goals {
            action: GoalsAction::Delete { id: 7 }
        }
    ));
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello world", 8), "hello...");
    assert_eq!(truncate("ab", 2), "ab");
    // Multi-byte characters are not split
    assert_eq!(truncate("café au lait", 7), "café...");
}

#[test]
fn test_parse_date() {
    assert_eq!(commands::parse_date("2024-03-15", "test").unwrap(), date(2024, 3, 15));
    let err = commands::parse_date("03/15/2024", "--from").unwrap_err();
    assert!(err.to_string().contains("--from"));
    assert_eq!(commands::parse_optional_date(None, "--to").unwrap(), None);
}

#[test]
fn test_parse_housing_option() {
    let option = commands::parse_housing_option("Dorm:800:100:50").unwrap();
    assert_eq!(option.name, "Dorm");
    assert_eq!(option.monthly_total().unwrap(), dec!(950));

    let rent_only = commands::parse_housing_option("Studio:1100").unwrap();
    assert_eq!(rent_only.monthly_total().unwrap(), dec!(1100));

    assert!(commands::parse_housing_option("Dorm").is_err());
    assert!(commands::parse_housing_option("Dorm:cheap").is_err());
    assert!(commands::parse_housing_option(":800").is_err());
}

#[test]
fn test_loan_rate_is_entered_as_percent() {
    let cli = Cli::try_parse_from([
        "fincoach", "simulate", "loan", "--principal", "10000", "--rate", "5", "--term-months",
        "120",
    ])
    .unwrap();
    let Commands::Simulate { scenario } = cli.command else {
        panic!("expected simulate");
    };
    assert!(matches!(scenario, SimulateAction::Loan { .. }));

    let (inputs, run) = commands::scenario_inputs(scenario).unwrap();
    assert!(!run.save);
    match inputs {
        ScenarioInputs::LoanRepayment(loan) => {
            assert_eq!(loan.annual_rate, dec!(0.05));
            assert_eq!(loan.extra_monthly_payment, dec!(0));
        }
        _ => panic!("expected loan inputs"),
    }
}

// ========== Profile Command Tests ==========

#[test]
fn test_cmd_profile_create_and_list() {
    let db = setup_test_db();
    commands::cmd_profile_create(&db, "Alex", dec!(1500), RiskTolerance::Low).unwrap();

    let profiles = db.list_profiles().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "Alex");

    assert!(commands::cmd_profile_list(&db).is_ok());
    assert!(commands::cmd_profile_show(&db, profiles[0].id).is_ok());
}

#[test]
fn test_cmd_profile_create_rejects_blank_name() {
    let db = setup_test_db();
    let result = commands::cmd_profile_create(&db, "  ", dec!(0), RiskTolerance::Moderate);
    assert!(result.is_err());
}

#[test]
fn test_cmd_profile_show_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_profile_show(&db, 42);
    assert!(result.unwrap_err().to_string().contains("Not found"));
}

#[test]
fn test_cmd_profile_updates() {
    let db = setup_test_db();
    let id = create_test_profile(&db);

    commands::cmd_profile_set_income(&db, id, dec!(2400)).unwrap();
    commands::cmd_profile_set_risk(&db, id, RiskTolerance::High).unwrap();

    let profile = db.require_profile(id).unwrap();
    assert_eq!(profile.monthly_income, dec!(2400));
    assert_eq!(profile.risk_tolerance, RiskTolerance::High);

    assert!(commands::cmd_profile_set_income(&db, id, dec!(-1)).is_err());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_tx_add() {
    let db = setup_test_db();
    let id = create_test_profile(&db);

    commands::cmd_tx_add(&db, id, "2024-01-05", dec!(-12.50), Category::Food, "Lunch").unwrap();

    let txs = db.list_transactions(id, None, None).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, dec!(-12.50));
    assert_eq!(txs[0].note, "Lunch");
}

#[test]
fn test_cmd_tx_add_invalid_date() {
    let db = setup_test_db();
    let id = create_test_profile(&db);

    let result = commands::cmd_tx_add(&db, id, "yesterday", dec!(-1), Category::Food, "");
    assert!(result.is_err());
    assert_eq!(db.count_transactions(id).unwrap(), 0);
}

#[test]
fn test_cmd_tx_add_unknown_profile() {
    let db = setup_test_db();
    let result = commands::cmd_tx_add(&db, 7, "2024-01-05", dec!(-1), Category::Food, "");
    assert!(result.is_err());
}

#[test]
fn test_cmd_tx_import_is_idempotent() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    let file = write_temp(SAMPLE_CSV);

    commands::cmd_tx_import(&db, id, file.path()).unwrap();
    assert_eq!(db.count_transactions(id).unwrap(), 6);

    commands::cmd_tx_import(&db, id, file.path()).unwrap();
    assert_eq!(db.count_transactions(id).unwrap(), 6);
}

#[test]
fn test_cmd_tx_import_bad_header() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    let file = write_temp("Transaction Date,Description,Amount\n01/05/2024,COFFEE,-4.50\n");

    let result = commands::cmd_tx_import(&db, id, file.path());
    assert!(result.is_err());
    assert_eq!(db.count_transactions(id).unwrap(), 0);
}

#[test]
fn test_cmd_tx_list_with_range() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    let file = write_temp(SAMPLE_CSV);
    commands::cmd_tx_import(&db, id, file.path()).unwrap();

    assert!(commands::cmd_tx_list(&db, id, Some("2024-02-01"), None).is_ok());
    assert!(commands::cmd_tx_list(&db, id, Some("Feb 1"), None).is_err());
}

// ========== Goals Command Tests ==========

#[test]
fn test_cmd_goals_add_and_contribute() {
    let db = setup_test_db();
    let id = create_test_profile(&db);

    commands::cmd_goals_add(&db, id, "New laptop", dec!(1200), "2030-06-01").unwrap();
    let goals = db.list_goals(id).unwrap();
    assert_eq!(goals.len(), 1);
    let goal_id = goals[0].id;

    commands::cmd_goals_contribute(&db, goal_id, dec!(200)).unwrap();
    commands::cmd_goals_contribute(&db, goal_id, dec!(1000)).unwrap();

    let goal = db.get_goal(goal_id).unwrap().unwrap();
    assert_eq!(goal.current_amount, dec!(1200));
    assert!(goal.is_complete());

    assert!(commands::cmd_goals_list(&db, id).is_ok());
}

#[test]
fn test_cmd_goals_contribute_rejects_non_positive() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    commands::cmd_goals_add(&db, id, "Trip", dec!(500), "2030-06-01").unwrap();
    let goal_id = db.list_goals(id).unwrap()[0].id;

    assert!(commands::cmd_goals_contribute(&db, goal_id, dec!(0)).is_err());
    assert!(commands::cmd_goals_contribute(&db, goal_id, dec!(-5)).is_err());
    assert!(db.list_contributions(goal_id).unwrap().is_empty());
}

#[test]
fn test_cmd_goals_add_rejects_zero_target() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    assert!(commands::cmd_goals_add(&db, id, "Nothing", dec!(0), "2030-06-01").is_err());
}

#[test]
fn test_cmd_goals_delete() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    commands::cmd_goals_add(&db, id, "Concert", dec!(150), "2030-06-01").unwrap();
    let goal_id = db.list_goals(id).unwrap()[0].id;
    commands::cmd_goals_contribute(&db, goal_id, dec!(40)).unwrap();

    commands::cmd_goals_delete(&db, goal_id).unwrap();
    assert!(db.get_goal(goal_id).unwrap().is_none());
    assert!(db.list_goals(id).unwrap().is_empty());
    assert!(db.list_contributions(goal_id).unwrap().is_empty());

    let err = commands::cmd_goals_delete(&db, goal_id).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// ========== Analyze Command Tests ==========

#[test]
fn test_cmd_analyze_empty() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    assert!(commands::cmd_analyze(&db, &config(), id, None, None, false).is_ok());
}

#[test]
fn test_cmd_analyze_with_data() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    let file = write_temp(SAMPLE_CSV);
    commands::cmd_tx_import(&db, id, file.path()).unwrap();

    assert!(commands::cmd_analyze(&db, &config(), id, None, None, false).is_ok());
    assert!(commands::cmd_analyze(&db, &config(), id, Some("2024-01-01"), Some("2024-01-31"), true).is_ok());
}

#[test]
fn test_cmd_analyze_reversed_window() {
    let db = setup_test_db();
    let id = create_test_profile(&db);
    let file = write_temp(SAMPLE_CSV);
    commands::cmd_tx_import(&db, id, file.path()).unwrap();

    // No transactions fall in a reversed range, so there is nothing to analyze
    assert!(commands::cmd_analyze(&db, &config(), id, Some("2024-02-28"), Some("2024-01-01"), false).is_ok());
}

// ========== Simulation Command Tests ==========

#[test]
fn test_cmd_simulate_without_save() {
    let inputs = ScenarioInputs::WorkStudy(WorkStudyInputs::new(dec!(15), dec!(12)));
    assert!(commands::cmd_simulate(None, &config(), &inputs, None, false).is_ok());
    assert!(commands::cmd_simulate(None, &config(), &inputs, None, true).is_ok());
}

#[test]
fn test_cmd_simulate_invalid_inputs() {
    let inputs = ScenarioInputs::WorkStudy(WorkStudyInputs::new(dec!(-1), dec!(12)));
    assert!(commands::cmd_simulate(None, &config(), &inputs, None, false).is_err());
}

#[test]
fn test_cmd_simulate_save_and_rerun() {
    let db = setup_test_db();
    let id = create_test_profile(&db);

    let cli = Cli::try_parse_from([
        "fincoach", "simulate", "housing", "-o", "Dorm:800:100:50", "-o",
        "Shared:600:150:100", "--income", "2000", "--save", "--profile", "1",
    ])
    .unwrap();
    let Commands::Simulate { scenario } = cli.command else {
        panic!("expected simulate");
    };
    let (inputs, run) = commands::scenario_inputs(scenario).unwrap();
    assert!(run.save);

    commands::cmd_simulate(Some(&db), &config(), &inputs, Some(id), false).unwrap();
    let saved = db.list_simulations(id).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].scenario_type, ScenarioType::Housing);

    assert!(commands::cmd_simulations_show(&db, saved[0].id, false).is_ok());
    assert!(commands::cmd_simulations_show(&db, saved[0].id, true).is_ok());

    commands::cmd_simulations_rerun(&db, &config(), saved[0].id).unwrap();
    let runs = db.list_simulations(id).unwrap();
    assert_eq!(runs.len(), 2);
    // The original run is untouched
    assert_eq!(runs[1], saved[0]);
    assert_eq!(runs[0].result, saved[0].result);

    assert!(commands::cmd_simulations_list(&db, id).is_ok());
}

#[test]
fn test_cmd_simulate_save_unknown_profile() {
    let db = setup_test_db();
    let inputs = ScenarioInputs::MealPlan(fincoach_core::simulators::MealPlanInputs {
        plan_cost: dec!(2000),
        plan_meals: 200,
        grocery_monthly: dec!(350),
        grocery_meals: 30,
    });

    assert!(commands::cmd_simulate(Some(&db), &config(), &inputs, Some(99), false).is_err());
}

#[test]
fn test_cmd_simulations_show_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_simulations_show(&db, 5, false);
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Terms Command Tests ==========

#[test]
fn test_cmd_terms_show() {
    let kb = KnowledgeBase::embedded().unwrap();
    assert!(commands::cmd_terms_show(&kb, "Budget").is_ok());
    // Aliases resolve to the canonical term
    assert!(commands::cmd_terms_show(&kb, "apr").is_ok());

    let result = commands::cmd_terms_show(&kb, "Bitcoin");
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_cmd_terms_search_and_related() {
    let kb = KnowledgeBase::embedded().unwrap();
    assert!(commands::cmd_terms_search(&kb, "credit").is_ok());
    assert!(commands::cmd_terms_search(&kb, "zzz").is_ok());
    assert!(commands::cmd_terms_related(&kb, "Student Loan").is_ok());
    assert!(commands::cmd_terms_related(&kb, "Bitcoin").is_err());
}

#[test]
fn test_cmd_terms_category() {
    let kb = KnowledgeBase::embedded().unwrap();
    assert!(commands::cmd_terms_category(&kb, None).is_ok());
    assert!(commands::cmd_terms_category(&kb, Some("income")).is_ok());

    let result = commands::cmd_terms_category(&kb, Some("Astrology"));
    assert!(result.unwrap_err().to_string().contains("Available"));
}

#[test]
fn test_load_terms_from_file() {
    let file = write_temp(r#"{"Tuition": {"category": "School", "definition": "What classes cost."}}"#);
    let kb = commands::load_terms(file.path()).unwrap();
    assert_eq!(kb.len(), 1);
    assert!(commands::cmd_terms_show(&kb, "tuition").is_ok());

    let bad = write_temp("not json");
    assert!(commands::load_terms(bad.path()).is_err());
}

#[test]
fn test_cmd_terms_ask_every_kind() {
    let kb = KnowledgeBase::embedded().unwrap();
    for question in [
        "What is compound interest?",
        "Credit card vs debit card",
        "How do I build an emergency fund?",
        "Should I get a credit card?",
        "How much rent can I afford?",
        "I am worried about my scholarships",
        "xyzzy plugh",
    ] {
        assert!(commands::cmd_terms_ask(&kb, question).is_ok(), "{}", question);
    }
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fincoach.db");

    commands::cmd_init(&path).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path).unwrap();
    assert!(db.list_profiles().unwrap().is_empty());
}

#[test]
fn test_load_config_explicit_file() {
    let file = write_temp("[simulators]\nmax_work_hours_per_week = 15\n");
    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.simulators.max_work_hours_per_week, dec!(15));

    let bad = write_temp("[classifier]\ntrend_threshold_pct = -5\n");
    assert!(commands::load_config(Some(bad.path())).is_err());
}
