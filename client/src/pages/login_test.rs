use super::*;

#[test]
fn tidy_code_uppercases_and_strips_spaces() {
    assert_eq!(tidy_code(" ab c2 34 "), "ABC234");
}

#[test]
fn tidy_code_caps_length() {
    assert_eq!(tidy_code("abc2345678"), "ABC234");
}

#[test]
fn code_is_complete_requires_six_alphanumerics() {
    assert!(code_is_complete("ABC234"));
    assert!(!code_is_complete("ABC23"));
    assert!(!code_is_complete("ABC23!"));
    assert!(!code_is_complete(""));
}

#[test]
fn sent_message_names_the_address() {
    assert!(sent_message("coach@gym.example").contains("coach@gym.example"));
}

#[test]
fn code_step_remembers_the_address() {
    let step = LoginStep::AskCode("coach@gym.example".into());
    assert_ne!(step, LoginStep::AskEmail);
    assert!(matches!(step, LoginStep::AskCode(ref email) if email == "coach@gym.example"));
}
