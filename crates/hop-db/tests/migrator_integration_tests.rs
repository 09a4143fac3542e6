//! Integration tests for running migrations against DuckDB.
//!
//! These tests drive `hop_core::Migrator` through `MigrationDb` and
//! `DuckDbRecordStore`, then verify both the history table and the schema
//! the migrations produced.

use duckdb::Connection;
use hop_core::{
    ActionResult, MigrateError, Migration, MigrationOutcome, MigrationRecordStore, Migrator,
    Transactional, Version,
};
use hop_db::{migrator_from_dir, DuckDbRecordStore, MigrationDb};

// ── Helpers ────────────────────────────────────────────────────────────

fn sql_step(from: Version, to: Version, sql: &'static str) -> Migration<Connection> {
    Migration::new(from, to, move |conn: &Connection| {
        conn.execute_batch(sql)?;
        Ok(())
    })
}

fn create_example(conn: &Connection) -> ActionResult {
    conn.execute_batch(
        "CREATE TABLE example (id INTEGER NOT NULL, name VARCHAR NOT NULL);
         INSERT INTO example VALUES (1, 'name #0'), (2, 'name #1');",
    )?;
    Ok(())
}

fn add_last_name() -> Migration<Connection> {
    sql_step(
        1,
        2,
        "ALTER TABLE example ADD COLUMN last_name VARCHAR DEFAULT 'default';",
    )
    .named("add_last_name")
}

fn swap_last_name_for_age() -> Migration<Connection> {
    sql_step(
        2,
        3,
        "ALTER TABLE example DROP COLUMN last_name;
         ALTER TABLE example ADD COLUMN age INTEGER DEFAULT 42;",
    )
    .named("swap_last_name_for_age")
}

fn run(
    db: &MigrationDb,
    target: Version,
    migrations: Vec<Migration<Connection>>,
) -> hop_core::MigrateResult<MigrationOutcome> {
    Migrator::new(target, create_example, migrations)?
        .apply_migrations(db, &DuckDbRecordStore::default())
}

fn versions(db: &MigrationDb) -> Vec<Version> {
    let store = DuckDbRecordStore::default();
    db.transaction(|conn| store.records(conn))
        .unwrap()
        .into_iter()
        .filter(|r| r.successful)
        .map(|r| r.version)
        .collect()
}

fn column_names(db: &MigrationDb, table: &str) -> Vec<String> {
    let mut stmt = db
        .conn()
        .prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
        )
        .unwrap();
    stmt.query_map(duckdb::params![table], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn table_exists(db: &MigrationDb, table: &str) -> bool {
    db.conn()
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            duckdb::params![table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
        > 0
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn test_bootstrap_then_upgrade_through_versions() {
    let db = MigrationDb::open_memory().unwrap();

    let outcome = run(&db, 1, vec![]).unwrap();
    assert!(matches!(outcome, MigrationOutcome::Bootstrapped { version: 1, .. }));
    assert_eq!(versions(&db), vec![1]);
    assert_eq!(column_names(&db, "example"), vec!["id", "name"]);

    run(&db, 2, vec![add_last_name()]).unwrap();
    assert_eq!(versions(&db), vec![1, 2]);
    assert_eq!(column_names(&db, "example"), vec!["id", "name", "last_name"]);

    let outcome = run(&db, 3, vec![add_last_name(), swap_last_name_for_age()]).unwrap();
    assert_eq!(outcome.version(), 3);
    assert_eq!(versions(&db), vec![1, 2, 3]);
    assert_eq!(column_names(&db, "example"), vec!["id", "name", "age"]);

    let age: i32 = db
        .conn()
        .query_row("SELECT age FROM example WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(age, 42);
}

#[test]
fn test_two_step_run_records_each_step() {
    let db = MigrationDb::open_memory().unwrap();
    run(&db, 1, vec![]).unwrap();

    let outcome = run(&db, 3, vec![add_last_name(), swap_last_name_for_age()]).unwrap();
    match outcome {
        MigrationOutcome::Migrated { steps, .. } => {
            let labels: Vec<String> = steps.into_iter().map(|s| s.label).collect();
            assert_eq!(labels, vec!["add_last_name", "swap_last_name_for_age"]);
        }
        other => panic!("expected Migrated, got {other:?}"),
    }

    let store = DuckDbRecordStore::default();
    let records = db.transaction(|conn| store.records(conn)).unwrap();
    let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["bootstrap", "add_last_name", "swap_last_name_for_age"]);
}

#[test]
fn test_rerun_at_target_is_noop() {
    let db = MigrationDb::open_memory().unwrap();
    run(&db, 1, vec![]).unwrap();
    run(&db, 2, vec![add_last_name()]).unwrap();

    let outcome = run(&db, 2, vec![add_last_name()]).unwrap();
    assert_eq!(outcome, MigrationOutcome::UpToDate { version: 2 });
    assert_eq!(versions(&db), vec![1, 2]);
}

#[test]
fn test_failing_middle_step_rolls_back_schema_and_records() {
    let db = MigrationDb::open_memory().unwrap();
    run(&db, 1, vec![]).unwrap();

    let migrations = vec![
        sql_step(1, 2, "CREATE TABLE audit (id INTEGER);"),
        sql_step(2, 3, "ALTER TABLE does_not_exist ADD COLUMN x INTEGER;"),
        sql_step(3, 4, "CREATE TABLE never_created (id INTEGER);"),
    ];
    let err = run(&db, 4, migrations).unwrap_err();

    assert!(matches!(err, MigrateError::Action(_)));
    assert!(err
        .as_action_error()
        .and_then(|e| e.downcast_ref::<duckdb::Error>())
        .is_some());

    assert_eq!(versions(&db), vec![1]);
    assert!(!table_exists(&db, "audit"));
    assert!(!table_exists(&db, "never_created"));

    let store = DuckDbRecordStore::default();
    let latest = db
        .transaction(|conn| store.latest_successful_version(conn))
        .unwrap();
    assert_eq!(latest, Some(1));
}

#[test]
fn test_failed_bootstrap_leaves_no_history() {
    let db = MigrationDb::open_memory().unwrap();
    let migrator = Migrator::new(
        1,
        |conn: &Connection| -> ActionResult {
            conn.execute_batch("CREATE TABLE half_done (id INTEGER); SELECT * FROM nowhere;")?;
            Ok(())
        },
        vec![],
    )
    .unwrap();

    assert!(migrator
        .apply_migrations(&db, &DuckDbRecordStore::default())
        .is_err());
    assert!(versions(&db).is_empty());
    assert!(!table_exists(&db, "half_done"));

    // the next run bootstraps from scratch
    run(&db, 1, vec![]).unwrap();
    assert_eq!(versions(&db), vec![1]);
}

#[test]
fn test_missing_path_reports_both_versions() {
    let db = MigrationDb::open_memory().unwrap();
    run(&db, 1, vec![]).unwrap();

    let err = run(&db, 3, vec![add_last_name()]).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::MissingPath {
            from: 1,
            to: 3,
            stalled_at: 2
        }
    ));
    assert_eq!(versions(&db), vec![1]);
}

#[test]
fn test_downgrade() {
    let db = MigrationDb::open_memory().unwrap();
    run(&db, 2, vec![]).unwrap();
    db.conn()
        .execute_batch("ALTER TABLE example ADD COLUMN last_name VARCHAR;")
        .unwrap();

    let drop_last_name = sql_step(2, 1, "ALTER TABLE example DROP COLUMN last_name;");
    let outcome = run(&db, 1, vec![add_last_name(), drop_last_name]).unwrap();

    assert_eq!(outcome.version(), 1);
    assert_eq!(versions(&db), vec![2, 1]);
    assert_eq!(column_names(&db, "example"), vec!["id", "name"]);
}

#[test]
fn test_history_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.duckdb");

    {
        let db = MigrationDb::open(&path).unwrap();
        run(&db, 1, vec![]).unwrap();
    }

    let db = MigrationDb::open(&path).unwrap();
    let outcome = run(&db, 2, vec![add_last_name()]).unwrap();
    assert!(matches!(
        outcome,
        MigrationOutcome::Migrated { from_version: 1, to_version: 2, .. }
    ));
    assert_eq!(versions(&db), vec![1, 2]);
}

#[test]
fn test_migrations_from_script_directory() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("migrations");
    std::fs::create_dir(&scripts).unwrap();
    std::fs::write(
        scripts.join("bootstrap.sql"),
        "CREATE TABLE example (id INTEGER, name VARCHAR);",
    )
    .unwrap();
    std::fs::write(
        scripts.join("0001_to_0002_add_last_name.sql"),
        "ALTER TABLE example ADD COLUMN last_name VARCHAR;",
    )
    .unwrap();
    std::fs::write(
        scripts.join("0002_to_0003_add_age.sql"),
        "ALTER TABLE example ADD COLUMN age INTEGER;",
    )
    .unwrap();

    let db = MigrationDb::open_memory().unwrap();
    let store = DuckDbRecordStore::new("schema_history").unwrap();

    migrator_from_dir(&scripts, 1)
        .unwrap()
        .apply_migrations(&db, &store)
        .unwrap();
    migrator_from_dir(&scripts, 3)
        .unwrap()
        .apply_migrations(&db, &store)
        .unwrap();

    let records = db.transaction(|conn| store.records(conn)).unwrap();
    let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["bootstrap", "0001_to_0002_add_last_name", "0002_to_0003_add_age"]
    );
    assert_eq!(
        column_names(&db, "example"),
        vec!["id", "name", "last_name", "age"]
    );
}
