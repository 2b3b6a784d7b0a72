use super::*;

fn entry() -> RosterEntry {
    RosterEntry {
        id: "a1".into(),
        name: "Ana".into(),
        belt: "purple".into(),
        weight_class: Some("feather".into()),
        gym: None,
        style: Some("guard player".into()),
        notes: None,
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
    }
}

#[test]
fn optional_field_drops_blank_input() {
    assert_eq!(optional_field("   "), None);
    assert_eq!(optional_field(" Atos "), Some("Atos".to_owned()));
}

#[test]
fn subtitle_joins_known_fields() {
    assert_eq!(entry_subtitle(&entry()), "purple belt · feather · guard player");
}

#[test]
fn belt_choices_match_server_ranks() {
    assert_eq!(BELTS, ["white", "blue", "purple", "brown", "black"]);
}
