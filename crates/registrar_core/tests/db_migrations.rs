use registrar_core::db::migrations::latest_version;
use registrar_core::db::{open_db, open_db_in_memory, open_db_with, DbError};
use registrar_core::DatabaseConfig;
use rusqlite::Connection;

const TABLES: [&str; 8] = [
    "careers",
    "cycles",
    "students",
    "teachers",
    "subjects",
    "subject_teachers",
    "academic_periods",
    "enrollments",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn file_databases_use_wal_journaling() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("registrar.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registrar.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "enrollments");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failing_migration_reports_its_version_and_leaves_schema_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");

    // A stray students table without career_id breaks the first migration's index.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE students (legacy TEXT);").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, .. } => assert_eq!(version, 1),
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let careers: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'careers';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(careers, 0);
}

#[test]
fn open_db_with_honors_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = DatabaseConfig {
        path: path.to_str().unwrap().to_string(),
        busy_timeout_ms: 250,
    };

    let conn = open_db_with(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

#[test]
fn subject_quota_check_rejects_out_of_range_counters() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO careers (id, name) VALUES ('c1', 'Career');
         INSERT INTO cycles (id, name, ordinal) VALUES ('y1', 'Cycle', 1);",
    )
    .unwrap();

    let over = conn.execute(
        "INSERT INTO subjects (id, name, career_id, cycle_id, total_quota, available_quota)
         VALUES ('s1', 'Over', 'c1', 'y1', 2, 3);",
        [],
    );
    assert!(over.is_err());

    let negative = conn.execute(
        "INSERT INTO subjects (id, name, career_id, cycle_id, total_quota, available_quota)
         VALUES ('s2', 'Negative', 'c1', 'y1', 2, -1);",
        [],
    );
    assert!(negative.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table {table}");
}
