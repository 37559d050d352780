#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Immutable runtime configuration for the fetch core.
///
/// Resolved once at startup by [`crate::config::load_fetcher_config`] and
/// passed into the core by constructor injection. The core never reads
/// process globals after construction.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub env: Environment,
    pub log_level: String,

    /// Same-origin API gateway, tried first for every listing resource.
    pub gateway_url: String,
    /// Direct URL of the logic/scraper service (alternate schema).
    pub logic_url: String,
    /// Analytics service used for trend aggregation and enrichment.
    pub analytics_url: String,
    /// Declared alternate mirrors for the logic service, tried after it.
    pub mirror_urls: Vec<String>,

    /// Public CORS-relay prefix used as the last-resort transport.
    pub cors_proxy_url: String,
    /// The relay is only consulted when this is `true` (default off).
    pub use_cors_proxy: bool,

    /// Timeout for primary listing calls (leaderboard, accounts, trends).
    pub listing_timeout_secs: u64,
    /// Timeout shared by concurrent analytics enrichment sub-queries.
    pub analytics_timeout_secs: u64,

    pub user_agent: String,
}
