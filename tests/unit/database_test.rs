//! Unit tests for the MangaHub database layer (connection + migrations).

use mangahub::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use mangahub::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_kv_store() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["kv_store", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_file_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mangahub.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', 'v', 0)",
                [],
            )
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let value: String = db
        .connection()
        .query_row("SELECT value FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, "v");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}
