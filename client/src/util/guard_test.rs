use std::sync::Arc;

use super::*;
use crate::state::session::{MemoryStorage, SESSION_TOKEN_KEY, TokenStorage};

fn protected() -> NavigationTarget {
    NavigationTarget::new("/protected", "")
}

fn store_with(storage: &MemoryStorage) -> SessionTokenStore {
    SessionTokenStore::new(Arc::new(storage.clone()))
}

// =============================================================================
// NavigationTarget
// =============================================================================

#[test]
fn target_drops_leading_question_mark() {
    let target = NavigationTarget::new("/analyses", "?athlete_id=a1");
    assert_eq!(target.query.as_deref(), Some("athlete_id=a1"));
    assert_eq!(target.as_href(), "/analyses?athlete_id=a1");
}

#[test]
fn target_without_query_is_bare_path() {
    assert_eq!(NavigationTarget::new("/athletes", "?").as_href(), "/athletes");
    assert_eq!(NavigationTarget::new("/athletes", "").query, None);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_a_no_token_redirects_to_login() {
    let storage = MemoryStorage::new();
    let decision = evaluate(&store_with(&storage), &protected());
    assert_eq!(decision, GuardDecision::Redirect("/login?redirect=%2Fprotected".to_owned()));
}

#[test]
fn scenario_b_canonical_token_renders() {
    let storage = MemoryStorage::new();
    storage.write("jiumetrics_token", "valid-token");
    assert_eq!(evaluate(&store_with(&storage), &protected()), GuardDecision::Render);
}

#[test]
fn scenario_c_token_under_wrong_key_redirects() {
    let storage = MemoryStorage::new();
    storage.write("token", "valid-token");
    assert!(matches!(
        evaluate(&store_with(&storage), &protected()),
        GuardDecision::Redirect(_)
    ));
}

#[test]
fn other_lookalike_keys_do_not_satisfy_guard() {
    for key in ["authToken", "jiumetricsToken", "sb-access-token", "JIUMETRICS_TOKEN"] {
        let storage = MemoryStorage::new();
        storage.write(key, "valid-token");
        assert!(
            matches!(evaluate(&store_with(&storage), &protected()), GuardDecision::Redirect(_)),
            "key {key} must not count as a session"
        );
    }
}

#[test]
fn clearing_token_after_render_redirects_again() {
    let storage = MemoryStorage::new();
    let store = store_with(&storage);
    store.set("valid-token");
    assert_eq!(evaluate(&store, &protected()), GuardDecision::Render);

    store.clear();
    assert!(matches!(evaluate(&store, &protected()), GuardDecision::Redirect(_)));
}

#[test]
fn token_written_elsewhere_is_picked_up_without_reconstructing_store() {
    let storage = MemoryStorage::new();
    let store = store_with(&storage);
    assert!(matches!(evaluate(&store, &protected()), GuardDecision::Redirect(_)));

    storage.write(SESSION_TOKEN_KEY, "valid-token");
    assert_eq!(evaluate(&store, &protected()), GuardDecision::Render);
}

#[test]
fn evaluation_leaves_token_untouched() {
    let storage = MemoryStorage::new();
    storage.write(SESSION_TOKEN_KEY, "valid-token");
    let store = store_with(&storage);
    let _ = evaluate(&store, &protected());
    let _ = evaluate(&store, &protected());
    assert_eq!(storage.read(SESSION_TOKEN_KEY).as_deref(), Some("valid-token"));
}

// =============================================================================
// check_access
// =============================================================================

#[test]
fn any_non_empty_token_renders() {
    assert_eq!(check_access(&protected(), Some("x")), GuardDecision::Render);
    assert_eq!(check_access(&protected(), Some("not.a.jwt")), GuardDecision::Render);
}

#[test]
fn blank_token_redirects() {
    assert!(matches!(check_access(&protected(), Some("")), GuardDecision::Redirect(_)));
    assert!(matches!(check_access(&protected(), Some("  ")), GuardDecision::Redirect(_)));
}

#[test]
fn redirect_preserves_path_and_query() {
    let target = NavigationTarget::new("/analyses", "?athlete_id=a1&opponent_id=o2");
    assert_eq!(
        check_access(&target, None),
        GuardDecision::Redirect("/login?redirect=%2Fanalyses%3Fathlete_id%3Da1%26opponent_id%3Do2".to_owned())
    );
}

// =============================================================================
// return_target
// =============================================================================

#[test]
fn return_target_accepts_local_paths() {
    assert_eq!(return_target(Some("/protected")), "/protected");
    assert_eq!(return_target(Some("/analyses?athlete_id=a1")), "/analyses?athlete_id=a1");
}

#[test]
fn return_target_round_trips_login_redirect() {
    let target = NavigationTarget::new("/opponents", "?sort=belt");
    let GuardDecision::Redirect(href) = check_access(&target, None) else {
        panic!("expected redirect");
    };
    let encoded = href.split_once("redirect=").map(|(_, v)| v).unwrap();
    let decoded = urlencoding::decode(encoded).unwrap();
    assert_eq!(return_target(Some(&decoded)), "/opponents?sort=belt");
}

#[test]
fn return_target_defaults_to_root() {
    assert_eq!(return_target(None), "/");
    assert_eq!(return_target(Some("")), "/");
}

#[test]
fn return_target_rejects_external_and_protocol_relative() {
    for bad in [
        "https://evil.example.com/",
        "//evil.example.com",
        "/\\evil.example.com",
        "javascript:alert(1)",
        "athletes",
        "/athletes\n",
    ] {
        assert_eq!(return_target(Some(bad)), "/", "{bad:?} must not be honored");
    }
}

#[test]
fn return_target_refuses_login_loop() {
    assert_eq!(return_target(Some("/login")), "/");
    assert_eq!(return_target(Some("/login/")), "/");
    assert_eq!(return_target(Some("/login?redirect=%2F")), "/");
    assert_eq!(return_target(Some("/login-help")), "/login-help");
}

// =============================================================================
// RouteOutcome
// =============================================================================

#[test]
fn unmounted_route_stays_pending_even_with_token() {
    let storage = MemoryStorage::new();
    let store = store_with(&storage);
    store.set("valid-token");
    let outcome = route_outcome(false, &store, &protected());
    assert_eq!(outcome, RouteOutcome::Pending);
    assert_eq!(outcome.redirect_href(), None);
}

#[test]
fn mounted_route_without_token_redirects_with_replace_target() {
    let store = store_with(&MemoryStorage::new());
    let outcome = route_outcome(true, &store, &protected());
    assert_eq!(outcome.redirect_href(), Some("/login?redirect=%2Fprotected"));
}

#[test]
fn route_renavigation_after_clear_redirects_to_new_target() {
    let storage = MemoryStorage::new();
    let store = store_with(&storage);

    // Sign in, land on the roster.
    store.set("valid-token");
    let athletes = NavigationTarget::new("/athletes", "");
    assert_eq!(route_outcome(true, &store, &athletes), RouteOutcome::Content);

    // Sign out, then follow a link to analyses.
    store.clear();
    let analyses = NavigationTarget::new("/analyses", "?athlete_id=a1");
    assert_eq!(
        route_outcome(true, &store, &analyses).redirect_href(),
        Some("/login?redirect=%2Fanalyses%3Fathlete_id%3Da1")
    );
}

#[test]
fn route_content_has_no_redirect() {
    assert_eq!(RouteOutcome::Content.redirect_href(), None);
}
