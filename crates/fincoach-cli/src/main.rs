//! Fincoach CLI - Student budget analysis and financial simulations
//!
//! Usage:
//!   fincoach init                                Initialize database
//!   fincoach profile create --name Sam --income 1800
//!   fincoach tx import --profile 1 --file bank.csv
//!   fincoach analyze --profile 1                 Patterns, recommendations, budget
//!   fincoach simulate loan --principal 20000 --rate 5.5 --term-months 120
//!   fincoach terms show apr

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Profile { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                ProfileAction::Create { name, income, risk } => {
                    commands::cmd_profile_create(&db, &name, income, risk)
                }
                ProfileAction::Show { id } => commands::cmd_profile_show(&db, id),
                ProfileAction::List => commands::cmd_profile_list(&db),
                ProfileAction::SetIncome { id, income } => {
                    commands::cmd_profile_set_income(&db, id, income)
                }
                ProfileAction::SetRisk { id, risk } => commands::cmd_profile_set_risk(&db, id, risk),
            }
        }
        Commands::Tx { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                TxAction::Add {
                    profile,
                    date,
                    amount,
                    category,
                    note,
                } => commands::cmd_tx_add(&db, profile, &date, amount, category, &note),
                TxAction::List { profile, from, to } => {
                    commands::cmd_tx_list(&db, profile, from.as_deref(), to.as_deref())
                }
                TxAction::Import { profile, file } => commands::cmd_tx_import(&db, profile, &file),
            }
        }
        Commands::Goals { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                GoalsAction::Add {
                    profile,
                    description,
                    target,
                    by,
                } => commands::cmd_goals_add(&db, profile, &description, target, &by),
                GoalsAction::List { profile } => commands::cmd_goals_list(&db, profile),
                GoalsAction::Contribute { id, amount } => {
                    commands::cmd_goals_contribute(&db, id, amount)
                }
                GoalsAction::Delete { id } => commands::cmd_goals_delete(&db, id),
            }
        }
        Commands::Analyze {
            profile,
            from,
            to,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_analyze(&db, &config, profile, from.as_deref(), to.as_deref(), json)
        }
        Commands::Simulate { scenario } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let (inputs, run) = commands::scenario_inputs(scenario)?;
            // --save requires --profile
            let save_to = if run.save { run.profile } else { None };
            let db = match save_to {
                Some(_) => Some(commands::open_db(&cli.db)?),
                None => None,
            };
            commands::cmd_simulate(db.as_ref(), &config, &inputs, save_to, run.json)
        }
        Commands::Simulations { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                SimulationsAction::List { profile } => commands::cmd_simulations_list(&db, profile),
                SimulationsAction::Show { id, json } => {
                    commands::cmd_simulations_show(&db, id, json)
                }
                SimulationsAction::Rerun { id } => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_simulations_rerun(&db, &config, id)
                }
            }
        }
        Commands::Terms { file, action } => {
            let loaded;
            let kb = match file {
                Some(path) => {
                    loaded = commands::load_terms(&path)?;
                    &loaded
                }
                None => fincoach_core::KnowledgeBase::global(),
            };
            match action {
                TermsAction::Show { name } => commands::cmd_terms_show(kb, &name),
                TermsAction::Search { keyword } => commands::cmd_terms_search(kb, &keyword),
                TermsAction::Category { name } => commands::cmd_terms_category(kb, name.as_deref()),
                TermsAction::Related { name } => commands::cmd_terms_related(kb, &name),
                TermsAction::Ask { question } => commands::cmd_terms_ask(kb, &question.join(" ")),
            }
        }
    }
}
