//! Database schema migrations for dayplan.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 2;

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

/// Create the schema_version table if it doesn't exist.
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
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: one check-in, plan and reflection per user per date.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("applying schema migration v1");
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS check_ins (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            date          TEXT NOT NULL,
            mood          INTEGER NOT NULL CHECK (mood BETWEEN 1 AND 5),
            energy_level  INTEGER NOT NULL CHECK (energy_level BETWEEN 1 AND 5),
            note          TEXT,
            created_at    TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS day_plans (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            check_in_id   TEXT NOT NULL REFERENCES check_ins(id),
            date          TEXT NOT NULL,
            plan          TEXT NOT NULL DEFAULT '[]',
            current_step  INTEGER NOT NULL DEFAULT 0 CHECK (current_step >= 0),
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS reflections (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            date          TEXT NOT NULL,
            day_plan_id   TEXT REFERENCES day_plans(id),
            rating        INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
            notes         TEXT,
            created_at    TEXT NOT NULL,
            UNIQUE (user_id, date)
        );",
    )?;
    set_schema_version(conn, 1)?;
    Ok(())
}

/// v2: remember the work window each plan was generated for.
///
/// Plans from v1 were always generated over the default 09:00-17:00 window.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    debug!("applying schema migration v2");
    conn.execute_batch(
        "ALTER TABLE day_plans ADD COLUMN work_start TEXT NOT NULL DEFAULT '09:00';
        ALTER TABLE day_plans ADD COLUMN work_end TEXT NOT NULL DEFAULT '17:00';",
    )?;
    set_schema_version(conn, 2)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn check_constraint_rejects_bad_energy() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO check_ins (id, user_id, date, mood, energy_level, created_at)
             VALUES ('x', 'u', '2026-01-01', 3, 9, '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn v1_plans_get_default_window() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO check_ins (id, user_id, date, mood, energy_level, created_at)
             VALUES ('c', 'u', '2026-01-01', 3, 3, '2026-01-01T00:00:00Z');
             INSERT INTO day_plans (id, user_id, check_in_id, date, created_at, updated_at)
             VALUES ('p', 'u', 'c', '2026-01-01', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z');",
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        let window: (String, String) = conn
            .query_row("SELECT work_start, work_end FROM day_plans WHERE id = 'p'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(window, ("09:00".to_string(), "17:00".to_string()));
    }
}
