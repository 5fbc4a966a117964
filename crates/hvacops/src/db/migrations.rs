//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies pending
//! ones in order.

use rusqlite::Connection;

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_jobs_table",
        sql: include_str!("sql/001_create_jobs.sql"),
    },
    Migration {
        version: 2,
        description: "create_systems_and_equipment_tables",
        sql: include_str!("sql/002_create_systems_equipment.sql"),
    },
    Migration {
        version: 3,
        description: "create_visits_table",
        sql: include_str!("sql/003_create_visits.sql"),
    },
    Migration {
        version: 4,
        description: "create_test_runs_table",
        sql: include_str!("sql/004_create_test_runs.sql"),
    },
    Migration {
        version: 5,
        description: "create_job_events_table",
        sql: include_str!("sql/005_create_job_events.sql"),
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();
        // Running again should be a no-op.
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_all_tables_exist() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        for table in ["jobs", "systems", "equipment", "visits", "test_runs", "job_events"] {
            let count: u32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn test_completed_run_uniqueness_enforced() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO jobs (id, job_type, project_type, ops_status, created_at, updated_at)
             VALUES ('j1', 'ecc', 'alteration', 'scheduled', '2026-01-01', '2026-01-01');
             INSERT INTO systems (id, job_id, name) VALUES ('s1', 'j1', 'Upstairs');
             INSERT INTO visits (id, job_id, visit_number, status, needs_another_visit)
             VALUES ('v1', 'j1', 1, 'scheduled', 0);
             INSERT INTO test_runs (id, job_id, visit_id, system_id, test_type, is_completed, created_at, updated_at)
             VALUES ('r1', 'j1', 'v1', 's1', 'airflow', 1, '2026-01-01', '2026-01-01');",
        )
        .unwrap();

        // A second completed run for the same key violates the partial index.
        let result = conn.execute(
            "INSERT INTO test_runs (id, job_id, visit_id, system_id, test_type, is_completed, created_at, updated_at)
             VALUES ('r2', 'j1', 'v1', 's1', 'airflow', 1, '2026-01-01', '2026-01-01')",
            [],
        );
        assert!(result.is_err());

        // An uncompleted duplicate is allowed.
        conn.execute(
            "INSERT INTO test_runs (id, job_id, visit_id, system_id, test_type, is_completed, created_at, updated_at)
             VALUES ('r3', 'j1', 'v1', 's1', 'airflow', 0, '2026-01-01', '2026-01-01')",
            [],
        )
        .unwrap();
    }
}
