//! Database schema migrations for the circuit store.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: circuits and their ordered exercises.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("applying schema migration v1");
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS circuits (
            id          TEXT PRIMARY KEY,
            name        TEXT,
            rounds      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS exercises (
            id          TEXT PRIMARY KEY,
            circuit_id  TEXT NOT NULL REFERENCES circuits(id) ON DELETE CASCADE,
            position    INTEGER NOT NULL,
            name        TEXT,
            work_min    INTEGER,
            work_sec    INTEGER,
            rest_min    INTEGER,
            rest_sec    INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_exercises_circuit_position
            ON exercises(circuit_id, position);",
    )?;
    set_schema_version(conn, 1)
}

/// v2: history of completed runs.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    debug!("applying schema migration v2");
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS runs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            circuit_id    TEXT NOT NULL,
            circuit_name  TEXT NOT NULL DEFAULT '',
            rounds        INTEGER NOT NULL,
            work_secs     INTEGER NOT NULL,
            rest_secs     INTEGER NOT NULL,
            started_at    TEXT NOT NULL,
            completed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_runs_completed_at ON runs(completed_at);",
    )?;
    set_schema_version(conn, 2)
}
