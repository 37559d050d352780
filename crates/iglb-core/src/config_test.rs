use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn no_overrides() -> HashMap<String, String> {
    HashMap::new()
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let env: HashMap<&str, &str> = HashMap::new();
    let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.gateway_url, "http://localhost:5050");
    assert_eq!(cfg.logic_url, "https://scraper-service-907s.onrender.com");
    assert_eq!(cfg.analytics_url, "http://localhost:5052");
    assert!(cfg.mirror_urls.is_empty());
    assert!(!cfg.use_cors_proxy);
    assert_eq!(cfg.listing_timeout_secs, 12);
    assert_eq!(cfg.analytics_timeout_secs, 5);
    assert_eq!(cfg.user_agent, "iglb/0.1 (leaderboard-fetch)");
}

#[test]
fn env_var_beats_compiled_default() {
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert("IGLB_GATEWAY_URL", "http://gateway.internal:8080");
    let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
    assert_eq!(cfg.gateway_url, "http://gateway.internal:8080");
}

#[test]
fn override_beats_env_var() {
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert("IGLB_GATEWAY_URL", "http://from-env:1");
    let mut overrides = HashMap::new();
    overrides.insert(
        "IGLB_GATEWAY_URL".to_string(),
        "http://from-override:2".to_string(),
    );
    let cfg = build_fetcher_config(&overrides, lookup_from_map(&env)).unwrap();
    assert_eq!(cfg.gateway_url, "http://from-override:2");
}

#[test]
fn trailing_slashes_are_stripped_from_base_urls() {
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert("IGLB_LOGIC_URL", "http://logic.example.com/");
    let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
    assert_eq!(cfg.logic_url, "http://logic.example.com");
}

#[test]
fn mirror_urls_parse_as_comma_separated_list() {
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert(
        "IGLB_MIRROR_URLS",
        "http://mirror-a.example.com/, http://mirror-b.example.com,,",
    );
    let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
    assert_eq!(
        cfg.mirror_urls,
        vec![
            "http://mirror-a.example.com".to_string(),
            "http://mirror-b.example.com".to_string(),
        ]
    );
}

#[test]
fn use_cors_proxy_accepts_legacy_truthy_values() {
    for value in ["true", "TRUE", "1", "t"] {
        let mut env: HashMap<&str, &str> = HashMap::new();
        env.insert("IGLB_USE_CORS_PROXY", value);
        let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
        assert!(cfg.use_cors_proxy, "expected {value:?} to enable the relay");
    }
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert("IGLB_USE_CORS_PROXY", "yes");
    let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
    assert!(!cfg.use_cors_proxy, "unrecognized values must stay false");
}

#[test]
fn invalid_timeout_is_rejected() {
    let mut env: HashMap<&str, &str> = HashMap::new();
    env.insert("IGLB_LISTING_TIMEOUT_SECS", "not-a-number");
    let result = build_fetcher_config(&no_overrides(), lookup_from_map(&env));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "IGLB_LISTING_TIMEOUT_SECS"),
        "expected InvalidEnvVar(IGLB_LISTING_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn environment_parses_known_values() {
    for (raw, expected) in [
        ("development", Environment::Development),
        ("test", Environment::Test),
        ("production", Environment::Production),
        ("unknown", Environment::Development),
    ] {
        let mut env: HashMap<&str, &str> = HashMap::new();
        env.insert("IGLB_ENV", raw);
        let cfg = build_fetcher_config(&no_overrides(), lookup_from_map(&env)).unwrap();
        assert_eq!(cfg.env, expected);
    }
}
