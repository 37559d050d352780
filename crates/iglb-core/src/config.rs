use std::collections::HashMap;

use crate::app_config::{Environment, FetcherConfig};
use crate::ConfigError;

/// Load fetcher configuration with the three-tier resolution policy:
/// runtime-injected `overrides` first, then process environment variables,
/// then compiled defaults.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a resolved value cannot be parsed.
pub fn load_fetcher_config(overrides: &HashMap<String, String>) -> Result<FetcherConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_fetcher_config_from_env(overrides)
}

/// Load fetcher configuration from overrides plus env vars already in the
/// process. Unlike [`load_fetcher_config`], this does NOT load `.env` files —
/// useful for testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a resolved value cannot be parsed.
pub fn load_fetcher_config_from_env(
    overrides: &HashMap<String, String>,
) -> Result<FetcherConfig, ConfigError> {
    build_fetcher_config(overrides, |key| std::env::var(key))
}

/// Build the configuration using the provided env-var lookup function.
///
/// This is the core resolution logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed. Resolution order per key: `overrides` map, then `lookup`, then the
/// compiled default.
pub(crate) fn build_fetcher_config<F>(
    overrides: &HashMap<String, String>,
    lookup: F,
) -> Result<FetcherConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let resolve = |var: &str, default: &str| -> String {
        overrides
            .get(var)
            .cloned()
            .or_else(|| lookup(var).ok())
            .unwrap_or_else(|| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = resolve(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&resolve("IGLB_ENV", "development"));
    let log_level = resolve("IGLB_LOG_LEVEL", "info");

    let gateway_url = strip_trailing_slash(&resolve("IGLB_GATEWAY_URL", "http://localhost:5050"));
    let logic_url = strip_trailing_slash(&resolve(
        "IGLB_LOGIC_URL",
        "https://scraper-service-907s.onrender.com",
    ));
    let analytics_url =
        strip_trailing_slash(&resolve("IGLB_ANALYTICS_URL", "http://localhost:5052"));
    let mirror_urls = parse_url_list(&resolve("IGLB_MIRROR_URLS", ""));

    let cors_proxy_url = resolve("IGLB_CORS_PROXY_URL", "https://corsproxy.io/?");
    let use_cors_proxy = parse_bool(&resolve("IGLB_USE_CORS_PROXY", "false"));

    let listing_timeout_secs = parse_u64("IGLB_LISTING_TIMEOUT_SECS", "12")?;
    let analytics_timeout_secs = parse_u64("IGLB_ANALYTICS_TIMEOUT_SECS", "5")?;

    let user_agent = resolve("IGLB_USER_AGENT", "iglb/0.1 (leaderboard-fetch)");

    Ok(FetcherConfig {
        env,
        log_level,
        gateway_url,
        logic_url,
        analytics_url,
        mirror_urls,
        cors_proxy_url,
        use_cors_proxy,
        listing_timeout_secs,
        analytics_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Truthy parsing matching the legacy dashboard: `true`, `1`, `t`
/// (case-insensitive). Everything else is `false`.
fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "t")
}

/// Split a comma-separated URL list, dropping empty entries and trailing
/// slashes.
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(strip_trailing_slash)
        .collect()
}

fn strip_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
