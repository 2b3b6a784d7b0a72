use super::*;

#[test]
fn bearer_header_uses_bearer_scheme() {
    assert_eq!(bearer_header("valid-token"), "Bearer valid-token");
}

#[test]
fn failed_message_formats_status() {
    assert_eq!(failed_message("request code", 429), "request code failed: 429");
    assert_eq!(failed_message("list athletes", 500), "list athletes failed: 500");
}

#[test]
fn item_endpoints_format_expected_paths() {
    assert_eq!(roster_item_endpoint(RosterKind::Athlete, "a1"), "/api/athletes/a1");
    assert_eq!(roster_item_endpoint(RosterKind::Opponent, "o1"), "/api/opponents/o1");
    assert_eq!(analysis_endpoint("x9"), "/api/analyses/x9");
}

#[test]
fn needs_login_only_for_session_errors() {
    assert!(needs_login(SESSION_EXPIRED));
    assert!(needs_login(NOT_SIGNED_IN));
    assert!(!needs_login("list athletes failed: 500"));
}
