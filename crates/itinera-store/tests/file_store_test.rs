//! Integration tests for the filesystem snapshot store.
//!
//! Each test works in its own temporary directory.

use itinera_store::{FileStore, SnapshotStore, StoreConfig, StoreError};

fn open_temp_store() -> (FileStore, tempfile::TempDir) {
    let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
    let store = FileStore::open(StoreConfig::new(tmp.path().join("trips")))
        .expect("store should open");
    (store, tmp)
}

#[test]
fn open_creates_missing_directory() {
    let (store, _tmp) = open_temp_store();
    assert!(store.dir().is_dir());
}

#[test]
fn put_then_get_returns_contents() {
    let (store, _tmp) = open_temp_store();
    store.put("lisbon", r#"{"alerts":[]}"#).unwrap();
    assert_eq!(store.get("lisbon").unwrap(), r#"{"alerts":[]}"#);
    assert!(store.dir().join("lisbon.json").is_file());
    assert!(
        !store.dir().join("lisbon.json.tmp").exists(),
        "temporary file should be renamed into place"
    );
}

#[test]
fn put_overwrites_existing_snapshot() {
    let (store, _tmp) = open_temp_store();
    store.put("lisbon", "old").unwrap();
    store.put("lisbon", "new").unwrap();
    assert_eq!(store.get("lisbon").unwrap(), "new");
}

#[test]
fn get_missing_key_is_not_found() {
    let (store, _tmp) = open_temp_store();
    let err = store.get("nowhere").unwrap_err();
    assert!(
        matches!(err, StoreError::NotFound(ref k) if k == "nowhere"),
        "expected NotFound, got: {err}"
    );
}

#[test]
fn invalid_key_is_rejected_before_touching_disk() {
    let (store, _tmp) = open_temp_store();
    let err = store.put("../escape", "x").unwrap_err();
    assert!(matches!(err, StoreError::InvalidKey(_)), "got: {err}");
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn keys_lists_only_snapshot_files_sorted() {
    let (store, _tmp) = open_temp_store();
    store.put("rome", "{}").unwrap();
    store.put("athens", "{}").unwrap();
    std::fs::write(store.dir().join("notes.txt"), "ignore me").unwrap();

    assert_eq!(store.keys().unwrap(), vec!["athens", "rome"]);
}

#[test]
fn remove_reports_whether_snapshot_existed() {
    let (store, _tmp) = open_temp_store();
    store.put("rome", "{}").unwrap();
    assert!(store.remove("rome").unwrap());
    assert!(!store.remove("rome").unwrap());
    assert!(store.keys().unwrap().is_empty());
}
