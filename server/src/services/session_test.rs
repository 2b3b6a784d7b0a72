use super::*;

fn alice() -> SessionUser {
    SessionUser { id: Uuid::new_v4(), name: "alice".into(), email: Some("alice@example.com".into()) }
}

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionUser
// =============================================================================

#[test]
fn session_user_serializes_expected_fields() {
    let user = SessionUser { id: Uuid::nil(), name: "charlie".into(), email: None };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["name"], "charlie");
    assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
    assert!(json["email"].is_null());
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[tokio::test]
async fn memory_create_then_validate_returns_user() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let user = alice();
    let token = store.create(&user).await.unwrap();
    assert_eq!(token.len(), 64);
    assert_eq!(store.validate(&token).await.unwrap(), Some(user));
}

#[tokio::test]
async fn memory_unknown_token_is_none() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    assert_eq!(store.validate("nope").await.unwrap(), None);
}

#[tokio::test]
async fn memory_revoke_invalidates_token() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let token = store.create(&alice()).await.unwrap();
    store.revoke(&token).await.unwrap();
    assert_eq!(store.validate(&token).await.unwrap(), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn memory_revoke_unknown_token_is_ok() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    assert!(store.revoke("never-issued").await.is_ok());
}

#[test]
fn memory_expired_session_is_rejected_and_evicted() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let start = Instant::now();
    store.insert_at("t1", alice(), start + Duration::from_secs(5)).unwrap();

    assert!(store.validate_at("t1", start).unwrap().is_some());
    assert!(store.validate_at("t1", start + Duration::from_secs(5)).unwrap().is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn memory_sessions_are_independent() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let a = store.create(&alice()).await.unwrap();
    let b = store.create(&alice()).await.unwrap();
    store.revoke(&a).await.unwrap();
    assert!(store.validate(&b).await.unwrap().is_some());
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_prune_drops_every_expired_session() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let start = Instant::now();
    for i in 0..1000 {
        store.insert_at(&format!("t{i}"), alice(), start + Duration::from_millis(1)).unwrap();
    }
    assert_eq!(store.len(), 1000);

    assert_eq!(store.prune_expired_at(start + Duration::from_millis(20)).unwrap(), 1000);
    assert!(store.is_empty());
}

#[test]
fn memory_prune_keeps_live_sessions() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let start = Instant::now();
    store.insert_at("stale", alice(), start + Duration::from_secs(1)).unwrap();
    store.insert_at("live", alice(), start + Duration::from_secs(120)).unwrap();

    assert_eq!(store.prune_expired_at(start + Duration::from_secs(2)).unwrap(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.validate_at("live", start + Duration::from_secs(2)).unwrap().is_some());
}

#[tokio::test]
async fn prune_task_clears_abandoned_sessions() {
    let store = MemorySessionStore::new(Duration::from_millis(1));
    for _ in 0..1000 {
        store.create(&alice()).await.unwrap();
    }
    let handle = spawn_prune_task(Arc::new(store.clone()), Duration::from_millis(5));

    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.abort();
    assert!(store.is_empty(), "expired sessions still held: {}", store.len());
}
