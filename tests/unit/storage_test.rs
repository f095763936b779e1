//! Unit tests for the key-value storage backends.

use std::sync::Arc;

use mangahub::services::storage::{read_json, write_json, KeyValueStorage, MemoryStorage, SqliteStorage};
use mangahub::types::errors::StorageError;
use rstest::rstest;

fn backends() -> Vec<Arc<dyn KeyValueStorage>> {
    vec![
        Arc::new(MemoryStorage::new()),
        Arc::new(SqliteStorage::open_in_memory().unwrap()),
    ]
}

#[test]
fn test_set_get_remove_on_every_backend() {
    for storage in backends() {
        assert_eq!(storage.get_item("reader_settings").unwrap(), None);
        storage.set_item("reader_settings", r#"{"mode":"vertical"}"#).unwrap();
        assert_eq!(
            storage.get_item("reader_settings").unwrap().as_deref(),
            Some(r#"{"mode":"vertical"}"#)
        );
        storage.remove_item("reader_settings").unwrap();
        assert_eq!(storage.get_item("reader_settings").unwrap(), None);
    }
}

#[test]
fn test_remove_missing_key_is_ok() {
    for storage in backends() {
        assert!(storage.remove_item("nope").is_ok());
    }
}

#[test]
fn test_sqlite_storage_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mangahub.db");
    {
        let storage = SqliteStorage::open(&path).unwrap();
        storage.set_item("manga_history", "{}").unwrap();
    }
    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.get_item("manga_history").unwrap().as_deref(), Some("{}"));
}

#[test]
fn test_json_helpers_round_trip() {
    let storage = MemoryStorage::new();
    write_json(&storage, "numbers", &vec![1u32, 2, 3]).unwrap();
    let back: Option<Vec<u32>> = read_json(&storage, "numbers").unwrap();
    assert_eq!(back, Some(vec![1, 2, 3]));
    let missing: Option<Vec<u32>> = read_json(&storage, "absent").unwrap();
    assert_eq!(missing, None);
}

#[rstest]
#[case("")]
#[case("{")]
#[case("null")]
#[case("[1,2]")]
#[case("\"text\"")]
fn test_read_json_flags_malformed(#[case] raw: &str) {
    let storage = MemoryStorage::new();
    storage.set_item("reader_settings", raw).unwrap();
    let result = read_json::<mangahub::types::settings::ReaderSettings>(&storage, "reader_settings");
    match result {
        Err(StorageError::Malformed { key, .. }) => assert_eq!(key, "reader_settings"),
        other => panic!("expected Malformed, got {:?}", other),
    }
}
