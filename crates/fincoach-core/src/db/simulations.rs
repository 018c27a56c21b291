//! Saved simulation runs
//!
//! Results are append-only: re-running a scenario saves a new row and the
//! old one is left as it was.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{parse_col, timestamp_col, Database};
use crate::error::Result;
use crate::simulators::{ScenarioType, SimulationResult};

/// A persisted simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSimulation {
    pub id: i64,
    pub profile_id: i64,
    pub scenario_type: ScenarioType,
    pub created_at: DateTime<Utc>,
    pub result: SimulationResult,
}

/// Row as read from SQLite; the JSON is parsed afterwards so its errors
/// surface as `Error::Json`
struct SimulationRow {
    id: i64,
    profile_id: i64,
    scenario_type: ScenarioType,
    created_at: DateTime<Utc>,
    json: String,
}

impl SimulationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            scenario_type: parse_col(row, 2)?,
            created_at: timestamp_col(row, 3)?,
            json: row.get(4)?,
        })
    }

    fn into_stored(self) -> Result<StoredSimulation> {
        Ok(StoredSimulation {
            id: self.id,
            profile_id: self.profile_id,
            scenario_type: self.scenario_type,
            created_at: self.created_at,
            result: serde_json::from_str(&self.json)?,
        })
    }
}

impl Database {
    /// Save a simulation result, returning its ID
    pub fn save_simulation(&self, profile_id: i64, result: &SimulationResult) -> Result<i64> {
        let json = serde_json::to_string(result)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO simulations (profile_id, scenario_type, result) VALUES (?, ?, ?)",
            params![profile_id, result.scenario_type.as_str(), json],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(simulation_id = id, scenario = %result.scenario_type, "Saved simulation");
        Ok(id)
    }

    pub fn get_simulation(&self, id: i64) -> Result<Option<StoredSimulation>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, profile_id, scenario_type, created_at, result FROM simulations WHERE id = ?",
                params![id],
                SimulationRow::from_row,
            )
            .optional()?;

        row.map(SimulationRow::into_stored).transpose()
    }

    /// A profile's saved runs, newest first
    pub fn list_simulations(&self, profile_id: i64) -> Result<Vec<StoredSimulation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, profile_id, scenario_type, created_at, result
            FROM simulations
            WHERE profile_id = ?
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt
            .query_map(params![profile_id], SimulationRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(SimulationRow::into_stored).collect()
    }
}
