//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the engine policy file
//! - `parse_date` - Parse YYYY-MM-DD arguments
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fincoach_core::{config::default_config_path, db::Database, EngineConfig, KnowledgeBase};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

/// Load the engine config (explicit file, then data-dir override, then built-in)
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

pub fn load_terms(path: &Path) -> Result<KnowledgeBase> {
    KnowledgeBase::load(Some(path))
        .with_context(|| format!("Failed to load terms from {}", path.display()))
}

pub fn parse_date(s: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date '{}' (use YYYY-MM-DD)", what, s))
}

/// Parse an optional date argument
pub fn parse_optional_date(s: Option<&str>, what: &str) -> Result<Option<NaiveDate>> {
    s.map(|s| parse_date(s, what)).transpose()
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let profiles = db.list_profiles()?;
    println!("   Profiles: {}", profiles.len());

    match default_config_path() {
        Some(path) if path.exists() => println!("   Policy: {}", path.display()),
        _ => println!("   Policy: built-in defaults"),
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a profile: fincoach profile create --name <name> --income <monthly>");
    println!("  2. Import transactions: fincoach tx import --profile <id> --file bank.csv");
    println!("  3. Analyze spending: fincoach analyze --profile <id>");

    Ok(())
}
