pub mod app_config;
pub mod config;
pub mod model;

pub use app_config::{Environment, FetcherConfig};
pub use config::{load_fetcher_config, load_fetcher_config_from_env};
pub use model::{GrowthDelta, Leaderboard, Profile, TrendPoint, TrendSeries};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}
