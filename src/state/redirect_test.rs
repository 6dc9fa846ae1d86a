use super::*;

// =============================================================================
// FileRedirectStore
// =============================================================================

#[test]
fn file_take_on_empty_dir_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path(), None);
    assert_eq!(store.take().unwrap(), None);
}

#[test]
fn file_save_then_take_consumes_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path(), None);
    store.save("/workspaces/42?tab=resources").unwrap();

    assert_eq!(store.take().unwrap().as_deref(), Some("/workspaces/42?tab=resources"));
    assert_eq!(store.take().unwrap(), None);
    assert!(!store.path().exists());
}

#[test]
fn file_save_replaces_previous_intent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path(), None);
    store.save("/resources").unwrap();
    store.save("/templates/3").unwrap();
    assert_eq!(store.take().unwrap().as_deref(), Some("/templates/3"));
}

#[test]
fn file_save_creates_missing_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path().join("nested/state"), None);
    store.save("/secrets").unwrap();
    assert_eq!(store.take().unwrap().as_deref(), Some("/secrets"));
}

#[test]
fn file_intent_survives_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    FileRedirectStore::new(dir.path(), None).save("/workers").unwrap();
    let reloaded = FileRedirectStore::new(dir.path(), None);
    assert_eq!(reloaded.take().unwrap().as_deref(), Some("/workers"));
}

#[test]
fn file_stale_intent_discarded_with_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path(), Some(60));
    store.save("/storages").unwrap();
    assert_eq!(store.take_at(unix_now() + 61).unwrap(), None);
    assert!(!store.path().exists());
}

#[test]
fn file_garbage_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRedirectStore::new(dir.path(), None);
    std::fs::write(store.path(), b"not json").unwrap();
    assert_eq!(store.take().unwrap(), None);
    assert!(!store.path().exists());
}

// =============================================================================
// MemoryRedirectStore
// =============================================================================

#[test]
fn memory_take_clears() {
    let store = MemoryRedirectStore::default();
    store.save("/users").unwrap();
    assert_eq!(store.peek().as_deref(), Some("/users"));
    assert_eq!(store.take().unwrap().as_deref(), Some("/users"));
    assert_eq!(store.peek(), None);
}

#[test]
fn memory_ttl_boundary_is_inclusive() {
    let store = MemoryRedirectStore::new(Some(60));
    let saved_at = unix_now();
    store.save("/roles").unwrap();
    assert_eq!(store.take_at(saved_at + 60).as_deref(), Some("/roles"));

    store.save("/roles").unwrap();
    assert_eq!(store.take_at(unix_now() + 61), None);
}
