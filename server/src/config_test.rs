use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn missing_database_url_is_an_error() {
    let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn blank_database_url_is_an_error() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn defaults_apply_when_only_database_url_is_set() {
    let config = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/jm")])).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/jm");
    assert_eq!(config.port, 3000);
    assert_eq!(config.db_max_connections, 5);
    assert_eq!(config.session_ttl, Duration::from_secs(7 * 24 * 3600));
    assert_eq!(config.session_backend, SessionBackend::Postgres);
    assert!(!config.echo_login_codes);
    assert!(config.mail.is_none());
    assert_eq!(config.login_codes, LoginCodePolicy::default());
}

#[test]
fn overrides_are_parsed() {
    let config = ServerConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://db"),
        ("PORT", "8080"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("SESSION_TTL_HOURS", "2"),
        ("SESSION_BACKEND", "memory"),
        ("AUTH_ECHO_CODES", "yes"),
        ("RESEND_API_KEY", "re_123"),
        ("RESEND_FROM", "coach@jiumetrics.app"),
        ("LOGIN_CODE_TTL_MINUTES", "3"),
        ("LOGIN_CODE_MAX_ATTEMPTS", "2"),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.db_max_connections, 12);
    assert_eq!(config.session_ttl, Duration::from_secs(7200));
    assert_eq!(config.session_backend, SessionBackend::Memory);
    assert!(config.echo_login_codes);
    assert_eq!(
        config.mail,
        Some(MailConfig { api_key: "re_123".into(), from: "coach@jiumetrics.app".into() })
    );
    assert_eq!(config.login_codes, LoginCodePolicy { ttl: Duration::from_secs(180), max_attempts: 2 });
}

#[test]
fn zero_login_code_limits_are_rejected() {
    for key in ["LOGIN_CODE_TTL_MINUTES", "LOGIN_CODE_MAX_ATTEMPTS"] {
        let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), (key, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key, value: "0".into() });
    }
}

#[test]
fn invalid_port_reports_key_and_value() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "http")]))
        .unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "http".into() });
}

#[test]
fn zero_session_ttl_is_rejected() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("SESSION_TTL_HOURS", "0")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. }));
}

#[test]
fn unknown_session_backend_is_rejected() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("SESSION_BACKEND", "redis")]))
        .unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "SESSION_BACKEND", value: "redis".into() });
}

#[test]
fn garbage_echo_flag_is_rejected() {
    let err = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("AUTH_ECHO_CODES", "maybe")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "AUTH_ECHO_CODES", .. }));
}

#[test]
fn mail_requires_both_key_and_sender() {
    let config =
        ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("RESEND_API_KEY", "re_123")]))
            .unwrap();
    assert!(config.mail.is_none());
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", " On "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_rejects_other_values() {
    assert_eq!(parse_bool(""), None);
    assert_eq!(parse_bool("maybe"), None);
}

// =============================================================================
// env_parse: unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_parse_reads_valid_value() {
    let key = "__TEST_JM_ENV_PARSE_OK_311__";
    unsafe { std::env::set_var(key, " 42 ") };
    assert_eq!(env_parse(key, 7_u32), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_JM_ENV_PARSE_BAD_312__";
    unsafe { std::env::set_var(key, "many") };
    assert_eq!(env_parse(key, 7_u32), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse("__TEST_JM_ENV_PARSE_UNSET_313__", 9_u64), 9);
}
