use std::time::Duration;

use uuid::Uuid;

use super::*;
use crate::services::session::MemorySessionStore;

fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

fn coach() -> SessionUser {
    SessionUser { id: Uuid::new_v4(), name: "coach".into(), email: Some("coach@example.com".into()) }
}

// =============================================================================
// bearer_token
// =============================================================================

#[test]
fn bearer_token_missing_header() {
    assert!(matches!(bearer_token(&HeaderMap::new()), Err(AuthRejection::MissingCredentials)));
}

#[test]
fn bearer_token_extracts_token() {
    let headers = headers_with("Bearer abc123");
    assert_eq!(bearer_token(&headers).unwrap(), "abc123");
}

#[test]
fn bearer_token_scheme_is_case_insensitive() {
    let headers = headers_with("bearer abc123");
    assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    let headers = headers_with("BEARER abc123");
    assert_eq!(bearer_token(&headers).unwrap(), "abc123");
}

#[test]
fn bearer_token_rejects_other_schemes() {
    let headers = headers_with("Basic dXNlcjpwYXNz");
    assert!(matches!(bearer_token(&headers), Err(AuthRejection::MalformedCredentials)));
}

#[test]
fn bearer_token_rejects_scheme_without_token() {
    for raw in ["Bearer", "Bearer ", "Bearer    "] {
        let headers = headers_with(raw);
        assert!(
            matches!(bearer_token(&headers), Err(AuthRejection::MalformedCredentials)),
            "expected rejection for {raw:?}"
        );
    }
}

#[test]
fn bearer_token_rejects_bare_token() {
    let headers = headers_with("abc123");
    assert!(matches!(bearer_token(&headers), Err(AuthRejection::MalformedCredentials)));
}

#[test]
fn bearer_token_rejects_multiple_words() {
    let headers = headers_with("Bearer abc 123");
    assert!(matches!(bearer_token(&headers), Err(AuthRejection::MalformedCredentials)));
}

// =============================================================================
// AuthRejection
// =============================================================================

#[test]
fn rejection_statuses() {
    assert_eq!(AuthRejection::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AuthRejection::MalformedCredentials.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AuthRejection::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AuthRejection::Backend("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn unauthorized_response_carries_challenge_header() {
    let response = AuthRejection::InvalidToken.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[test]
fn backend_response_hides_details() {
    let rejection = AuthRejection::Backend("connection refused to 10.0.0.5".into());
    assert_eq!(rejection.public_message(), "internal error");
    let response = rejection.into_response();
    assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
}

// =============================================================================
// authorize
// =============================================================================

#[tokio::test]
async fn authorize_admits_valid_session() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let user = coach();
    let token = store.create(&user).await.unwrap();

    let authorized = authorize(&store, &headers_with(&format!("Bearer {token}"))).await.unwrap();
    assert_eq!(authorized.user, user);
    assert_eq!(authorized.token, token);
}

#[tokio::test]
async fn authorize_rejects_missing_header() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let err = authorize(&store, &HeaderMap::new()).await.unwrap_err();
    assert!(matches!(err, AuthRejection::MissingCredentials));
}

#[tokio::test]
async fn authorize_rejects_unknown_token() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let err = authorize(&store, &headers_with("Bearer valid-token")).await.unwrap_err();
    assert!(matches!(err, AuthRejection::InvalidToken));
}

#[tokio::test]
async fn authorize_rejects_revoked_token() {
    let store = MemorySessionStore::new(Duration::from_secs(60));
    let token = store.create(&coach()).await.unwrap();
    store.revoke(&token).await.unwrap();
    let err = authorize(&store, &headers_with(&format!("Bearer {token}"))).await.unwrap_err();
    assert!(matches!(err, AuthRejection::InvalidToken));
}
