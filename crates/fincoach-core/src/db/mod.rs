//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `profiles` - User profiles, income and risk tolerance
//! - `transactions` - Transaction insert/list with import deduplication
//! - `goals` - Savings goals and contribution events
//! - `simulations` - Saved simulation runs (append-only)
//!
//! Money is stored as TEXT and parsed back into `Decimal`, so values
//! round-trip exactly.

use std::error::Error as StdError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::Row;
use tracing::info;

use crate::error::Result;

mod goals;
mod profiles;
mod simulations;
mod transactions;

#[cfg(test)]
mod tests;

pub use simulations::StoredSimulation;
pub use transactions::{ImportSummary, TransactionInsertResult};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// SQLite `CURRENT_TIMESTAMP` text ("YYYY-MM-DD HH:MM:SS", UTC)
pub(crate) struct SqlTimestamp(pub DateTime<Utc>);

impl FromStr for SqlTimestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| Self(dt.and_utc()))
    }
}

/// Read a timestamp column; malformed text is a conversion error
pub(crate) fn timestamp_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    parse_col::<SqlTimestamp>(row, idx).map(|ts| ts.0)
}

/// Read a TEXT column and parse it with `FromStr`
pub(crate) fn parse_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Into<Box<dyn StdError + Send + Sync>>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: T::Err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        info!(path = %path, "Database ready");
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "fincoach_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Profiles
            CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                monthly_income TEXT NOT NULL DEFAULT '0',
                risk_tolerance TEXT NOT NULL DEFAULT 'moderate',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Transactions (immutable once recorded)
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                profile_id INTEGER NOT NULL REFERENCES profiles(id),
                date DATE NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                import_hash TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(profile_id, import_hash)
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_profile_date ON transactions(profile_id, date);

            -- Goals; current amount is derived from contributions
            CREATE TABLE IF NOT EXISTS goals (
                id INTEGER PRIMARY KEY,
                profile_id INTEGER NOT NULL REFERENCES profiles(id),
                description TEXT NOT NULL,
                target_amount TEXT NOT NULL,
                target_date DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_goals_profile ON goals(profile_id);

            CREATE TABLE IF NOT EXISTS goal_contributions (
                id INTEGER PRIMARY KEY,
                goal_id INTEGER NOT NULL REFERENCES goals(id),
                amount TEXT NOT NULL,
                contributed_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_goal_contributions_goal ON goal_contributions(goal_id);

            -- Simulation runs (never updated in place)
            CREATE TABLE IF NOT EXISTS simulations (
                id INTEGER PRIMARY KEY,
                profile_id INTEGER NOT NULL REFERENCES profiles(id),
                scenario_type TEXT NOT NULL,
                result TEXT NOT NULL,                      -- JSON SimulationResult
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_simulations_profile ON simulations(profile_id);
            "#,
        )?;

        Ok(())
    }
}
