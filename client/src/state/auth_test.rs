use super::*;

fn user() -> User {
    User { id: "u1".to_owned(), name: "Helena".to_owned(), email: Some("helena@example.com".to_owned()) }
}

#[test]
fn default_state_has_no_user() {
    let state = AuthState::default();
    assert!(state.user.is_none());
    assert_eq!(state.revision, 0);
}

#[test]
fn sign_in_and_out_bump_revision() {
    let mut state = AuthState::default();
    state.signed_in(user());
    assert_eq!(state.user.as_ref().map(|u| u.name.as_str()), Some("Helena"));
    assert_eq!(state.revision, 1);

    state.signed_out();
    assert!(state.user.is_none());
    assert_eq!(state.revision, 2);
}
