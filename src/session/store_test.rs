use super::*;

fn sample_session() -> Session {
    Session::new("access-1").with_refresh_token("refresh-1")
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[test]
fn memory_store_starts_empty() {
    let store = MemorySessionStore::new();
    assert!(store.load().is_none());
    assert!(store.raw().is_none());
}

#[test]
fn memory_store_save_then_load() {
    let store = MemorySessionStore::new();
    store.save(&sample_session()).unwrap();
    assert_eq!(store.load(), Some(sample_session()));
}

#[test]
fn memory_store_save_overwrites() {
    let store = MemorySessionStore::with_session(&sample_session());
    store.save(&Session::new("access-2")).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.access_token(), Some("access-2"));
    assert_eq!(loaded.refresh_token(), None);
}

#[test]
fn memory_store_clear_removes_blob() {
    let store = MemorySessionStore::with_session(&sample_session());
    store.clear().unwrap();
    assert!(store.load().is_none());
    assert!(store.raw().is_none());
}

#[test]
fn memory_store_clear_when_empty_succeeds() {
    assert!(MemorySessionStore::new().clear().is_ok());
}

#[test]
fn memory_store_malformed_blob_is_absent() {
    let store = MemorySessionStore::with_raw("{not json");
    assert!(store.load().is_none());
    // The blob itself is left alone; only clear() removes it.
    assert_eq!(store.raw().as_deref(), Some("{not json"));
}

#[test]
fn memory_store_wrong_shape_is_absent() {
    let store = MemorySessionStore::with_raw(r#"{"token": 42}"#);
    assert!(store.load().is_none());
}

// =============================================================================
// FileSessionStore
// =============================================================================

#[test]
fn file_store_path_uses_storage_key() {
    let store = FileSessionStore::new("/var/lib/appadmin");
    assert_eq!(store.path(), Path::new("/var/lib/appadmin/authUser.json"));
}

#[test]
fn file_store_missing_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    assert!(store.load().is_none());
}

#[test]
fn file_store_save_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested").join("deeper"));
    store.save(&sample_session()).unwrap();
    assert!(store.path().exists());
    assert_eq!(store.load(), Some(sample_session()));
}

#[test]
fn file_store_writes_plain_json_blob() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&sample_session()).unwrap();
    let raw = fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["token"], "access-1");
    assert_eq!(value["refreshToken"], "refresh-1");
}

#[test]
fn file_store_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&sample_session()).unwrap();
    let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(names.len(), 1);
}

#[cfg(unix)]
#[test]
fn file_store_restricts_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&sample_session()).unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn file_store_malformed_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    fs::write(store.path(), "<<garbage>>").unwrap();
    assert!(store.load().is_none());
}

#[test]
fn file_store_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&sample_session()).unwrap();
    store.clear().unwrap();
    assert!(!store.path().exists());
    assert!(store.load().is_none());
}

#[test]
fn file_store_clear_missing_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FileSessionStore::new(dir.path()).clear().is_ok());
}
