use super::*;

#[test]
fn user_deserializes_without_email() {
    let user: User = serde_json::from_str(r#"{"id":"u1","name":"Helena"}"#).unwrap();
    assert_eq!(user.email, None);
}

#[test]
fn login_response_carries_token_and_user() {
    let json = r#"{"token":"abc123","user":{"id":"u1","name":"Helena","email":"helena@example.com"}}"#;
    let resp: LoginResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.token, "abc123");
    assert_eq!(resp.user.email.as_deref(), Some("helena@example.com"));
}

#[test]
fn roster_kinds_target_separate_collections() {
    assert_eq!(RosterKind::Athlete.collection_path(), "/api/athletes");
    assert_eq!(RosterKind::Opponent.collection_path(), "/api/opponents");
    assert_eq!(RosterKind::Opponent.title(), "Opponents");
}

#[test]
fn new_roster_entry_omits_unset_fields() {
    let entry = NewRosterEntry { name: "Ana".into(), belt: Some("blue".into()), ..Default::default() };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "Ana", "belt": "blue" }));
}

#[test]
fn analysis_defaults_missing_strategy_to_null() {
    let json = r#"{
        "id":"a1","athlete_id":"x","opponent_id":"y","title":"Game plan",
        "summary":"Stay heavy on top","model":null,"created_at":"2026-01-01T00:00:00Z"
    }"#;
    let analysis: Analysis = serde_json::from_str(json).unwrap();
    assert!(analysis.strategy.is_null());
    assert_eq!(analysis.title, "Game plan");
}
