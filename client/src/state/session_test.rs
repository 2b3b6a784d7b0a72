use super::*;

fn memory_store() -> (SessionTokenStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    (SessionTokenStore::new(Arc::new(storage.clone())), storage)
}

#[test]
fn canonical_key_is_jiumetrics_token() {
    assert_eq!(SESSION_TOKEN_KEY, "jiumetrics_token");
}

#[test]
fn set_writes_under_canonical_key() {
    let (store, storage) = memory_store();
    store.set("valid-token");
    assert_eq!(storage.read("jiumetrics_token").as_deref(), Some("valid-token"));
    assert_eq!(store.get().as_deref(), Some("valid-token"));
}

#[test]
fn value_under_other_key_is_not_a_session() {
    let (store, storage) = memory_store();
    storage.write("token", "valid-token");
    assert_eq!(store.get(), None);
    assert!(!store.is_present());
}

#[test]
fn blank_values_count_as_absent() {
    let (store, storage) = memory_store();
    storage.write(SESSION_TOKEN_KEY, "");
    assert!(!store.is_present());
    storage.write(SESSION_TOKEN_KEY, "   ");
    assert!(!store.is_present());
}

#[test]
fn clear_removes_only_the_canonical_key() {
    let (store, storage) = memory_store();
    storage.write("jiumetrics_theme", "dark");
    store.set("valid-token");
    store.clear();
    assert!(!store.is_present());
    assert_eq!(storage.read("jiumetrics_theme").as_deref(), Some("dark"));
}

#[test]
fn reads_are_not_cached() {
    let (store, storage) = memory_store();
    store.set("first");
    assert_eq!(store.get().as_deref(), Some("first"));
    storage.write(SESSION_TOKEN_KEY, "second");
    assert_eq!(store.get().as_deref(), Some("second"));
    storage.remove(SESSION_TOKEN_KEY);
    assert_eq!(store.get(), None);
}

#[test]
fn clones_share_the_same_slot() {
    let (store, _) = memory_store();
    let other = store.clone();
    store.set("valid-token");
    assert!(other.is_present());
    other.clear();
    assert!(!store.is_present());
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn browser_storage_is_empty_outside_the_browser() {
    let store = SessionTokenStore::browser();
    store.set("valid-token");
    assert_eq!(store.get(), None);
}
