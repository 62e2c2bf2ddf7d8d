//! SQLite-based circuit storage.
//!
//! Provides persistent storage for:
//! - Circuits and their ordered exercises
//! - History of completed timer runs

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::circuit::{Circuit, Duration, Exercise};
use crate::error::{DatabaseError, Result};

/// One completed timer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub circuit_id: Uuid,
    pub circuit_name: String,
    pub rounds: u32,
    pub work_secs: u64,
    pub rest_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_runs: u64,
    pub total_work_secs: u64,
    pub total_rest_secs: u64,
    pub today_runs: u64,
    pub today_work_secs: u64,
}

/// SQLite store of circuits keyed by id.
///
/// Constructed explicitly and handed to whoever needs it; there is no
/// process-wide instance.
pub struct CircuitStore {
    conn: Connection,
}

impl CircuitStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the store at `<data dir>/circuits.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("circuits.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened circuit store");
        Self::init(conn)
    }

    /// Open an in-memory store (for tests and dry runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Circuits ─────────────────────────────────────────────────────

    /// Insert or replace a circuit together with its exercise list.
    ///
    /// Exercise ids are unique across the store; an id already owned by
    /// another circuit is rejected rather than moved.
    ///
    /// # Errors
    /// Returns an error if any statement fails; the write is rolled back.
    pub fn save_circuit(&self, circuit: &Circuit) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO circuits (id, name, rounds, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                rounds = excluded.rounds,
                updated_at = excluded.updated_at",
            params![
                circuit.id.to_string(),
                circuit.name,
                circuit.rounds,
                circuit.created_at.to_rfc3339(),
                circuit.updated_at.to_rfc3339(),
            ],
        )?;
        tx.execute(
            "DELETE FROM exercises WHERE circuit_id = ?1",
            params![circuit.id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO exercises
                    (id, circuit_id, position, name, work_min, work_sec, rest_min, rest_sec)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (position, exercise) in circuit.exercises.iter().enumerate() {
                stmt.execute(params![
                    exercise.id.to_string(),
                    circuit.id.to_string(),
                    position as i64,
                    exercise.name,
                    exercise.work.min,
                    exercise.work.sec,
                    exercise.rest.min,
                    exercise.rest.sec,
                ])?;
            }
        }
        tx.commit()?;
        info!(id = %circuit.id, exercises = circuit.exercises.len(), "saved circuit");
        Ok(())
    }

    /// Look up one circuit by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn get_circuit(&self, id: Uuid) -> Result<Option<Circuit>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, name, rounds, created_at, updated_at FROM circuits WHERE id = ?1",
                params![id.to_string()],
                CircuitHeader::from_row,
            )
            .optional()?;
        match header {
            Some(header) => Ok(Some(self.assemble(header)?)),
            None => Ok(None),
        }
    }

    /// All stored circuits, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_circuits(&self) -> Result<Vec<Circuit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, rounds, created_at, updated_at
             FROM circuits
             ORDER BY created_at, id",
        )?;
        let headers = stmt
            .query_map([], CircuitHeader::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        headers.into_iter().map(|h| self.assemble(h)).collect()
    }

    /// Delete a circuit and its exercises. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete_circuit(&self, id: Uuid) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM circuits WHERE id = ?1", params![id.to_string()])?;
        if removed > 0 {
            info!(%id, "deleted circuit");
        }
        Ok(removed > 0)
    }

    fn assemble(&self, header: CircuitHeader) -> Result<Circuit> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, work_min, work_sec, rest_min, rest_sec
             FROM exercises
             WHERE circuit_id = ?1
             ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![header.id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    Duration::new(row.get(2)?, row.get(3)?),
                    Duration::new(row.get(4)?, row.get(5)?),
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let exercises = rows
            .into_iter()
            .map(|(id, name, work, rest)| {
                Ok(Exercise {
                    id: parse_uuid("exercises", &id)?,
                    name,
                    work,
                    rest,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Circuit {
            id: parse_uuid("circuits", &header.id)?,
            name: header.name,
            rounds: header.rounds,
            exercises,
            created_at: parse_time("circuits", &header.created_at)?,
            updated_at: parse_time("circuits", &header.updated_at)?,
        })
    }

    // ── Run history ──────────────────────────────────────────────────

    /// Record a completed run. Returns the new row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_run(
        &self,
        circuit: &Circuit,
        work_secs: u64,
        rest_secs: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO runs (circuit_id, circuit_name, rounds, work_secs, rest_secs, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                circuit.id.to_string(),
                circuit.display_name(),
                circuit.rounds,
                work_secs,
                rest_secs,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent runs first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, circuit_id, circuit_name, rounds, work_secs, rest_secs, started_at, completed_at
             FROM runs
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, u64>(4)?,
                    row.get::<_, u64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(
                |(id, circuit_id, circuit_name, rounds, work_secs, rest_secs, started, completed)| {
                    Ok(RunRecord {
                        id,
                        circuit_id: parse_uuid("runs", &circuit_id)?,
                        circuit_name,
                        rounds,
                        work_secs,
                        rest_secs,
                        started_at: parse_time("runs", &started)?,
                        completed_at: parse_time("runs", &completed)?,
                    })
                },
            )
            .collect()
    }

    /// Totals over all runs plus today's (UTC) share.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats(&self) -> Result<Stats> {
        let (total_runs, total_work_secs, total_rest_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(work_secs), 0), COALESCE(SUM(rest_secs), 0) FROM runs",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?, row.get::<_, u64>(2)?)),
        )?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let (today_runs, today_work_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(work_secs), 0) FROM runs WHERE completed_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        Ok(Stats {
            total_runs,
            total_work_secs,
            total_rest_secs,
            today_runs,
            today_work_secs,
        })
    }
}

struct CircuitHeader {
    id: String,
    name: Option<String>,
    rounds: u32,
    created_at: String,
    updated_at: String,
}

impl CircuitHeader {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            rounds: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

fn parse_uuid(table: &'static str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        DatabaseError::CorruptRow {
            table,
            message: format!("bad id '{raw}': {e}"),
        }
        .into()
    })
}

fn parse_time(table: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table,
                message: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}
