//! Public entry points of the resilience core.
//!
//! `fetch_leaderboard` and `fetch_trends` are total from the caller's
//! perspective: whatever the upstream state, they resolve to a renderable
//! payload and never return an error. The remaining operations surface
//! [`FetchError`] normally — they are not covered by the totality contract.
//!
//! Concurrent overlapping fetches (an auto-refresh timer firing while a
//! manual refresh is in flight) are not coalesced; each call runs its own
//! independent chain.

mod mutations;

use std::time::Duration;

use chrono::Utc;
use iglb_core::{FetcherConfig, Leaderboard, TrendSeries};

pub use mutations::{AdminAction, MutationAck};

use crate::analytics::{self, ProfileAnalytics};
use crate::error::FetchError;
use crate::executor::{ChainExecutor, Outcome};
use crate::fallback;
use crate::normalize;
use crate::sources::{Resource, SourceRegistry};
use crate::status::{self, ServiceStatusReport};

/// Health probes answer fast or not at all; they share the enrichment-class
/// timeout rather than the listing one.
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Client for the leaderboard gateway and its collaborating services.
///
/// Holds the immutable configuration, the source registry, and the shared
/// HTTP client. No mutable state crosses calls; every fetch is independent.
pub struct LeaderboardClient {
    config: FetcherConfig,
    registry: SourceRegistry,
    executor: ChainExecutor,
}

impl LeaderboardClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let registry = SourceRegistry::new(&config);
        let executor = ChainExecutor::new(&config.user_agent)?;
        Ok(Self {
            config,
            registry,
            executor,
        })
    }

    /// Fetches the current leaderboard, trying each configured source in
    /// order and serving the degraded dataset when the chain is exhausted.
    ///
    /// Never fails: the result is always a well-formed snapshot. Pass
    /// `force_refresh` to add cache-busting for CDN-fronted sources.
    pub async fn fetch_leaderboard(&self, force_refresh: bool) -> Leaderboard {
        let resource = Resource::Profiles;
        let sources = self.registry.sources_for(&resource);
        let generated_at = Utc::now();
        let outcome = self
            .executor
            .execute(
                &resource.name(),
                &sources,
                self.registry.gateway_url(),
                force_refresh,
                |value| normalize::parse_leaderboard(value, generated_at),
            )
            .await;

        match outcome {
            Outcome::Success { payload, .. } => payload,
            Outcome::Failure(failures) => {
                tracing::warn!(
                    attempts = failures.len(),
                    dataset_version = fallback::dataset_version(),
                    "serving degraded leaderboard"
                );
                fallback::degraded_leaderboard(Utc::now())
            }
        }
    }

    /// Fetches follower trend series for all tracked accounts.
    ///
    /// Never fails: chain exhaustion yields the degraded trend dataset.
    pub async fn fetch_trends(&self, force_refresh: bool) -> Vec<TrendSeries> {
        let resource = Resource::Trends;
        let sources = self.registry.sources_for(&resource);
        let outcome = self
            .executor
            .execute(
                &resource.name(),
                &sources,
                self.registry.gateway_url(),
                force_refresh,
                normalize::parse_trends,
            )
            .await;

        match outcome {
            Outcome::Success { payload, .. } => payload,
            Outcome::Failure(failures) => {
                tracing::warn!(
                    attempts = failures.len(),
                    dataset_version = fallback::dataset_version(),
                    "serving degraded trends"
                );
                fallback::degraded_trends()
            }
        }
    }

    /// Fetches the tracked-account usernames.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Exhausted`] when every source failed.
    pub async fn fetch_accounts(&self) -> Result<Vec<String>, FetchError> {
        let resource = Resource::Accounts;
        let sources = self.registry.sources_for(&resource);
        let outcome = self
            .executor
            .execute(
                &resource.name(),
                &sources,
                self.registry.gateway_url(),
                false,
                normalize::parse_accounts,
            )
            .await;

        match outcome {
            Outcome::Success { payload, .. } => Ok(payload),
            Outcome::Failure(failures) => Err(FetchError::Exhausted {
                resource: resource.name(),
                failures,
            }),
        }
    }

    /// Fetches the follower history for one account.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] for a blank username and
    /// [`FetchError::Exhausted`] when every source failed.
    pub async fn fetch_profile_history(&self, username: &str) -> Result<TrendSeries, FetchError> {
        let username = mutations::normalize_username(username)?;
        let resource = Resource::ProfileHistory(username.clone());
        let sources = self.registry.sources_for(&resource);
        let outcome = self
            .executor
            .execute(
                &resource.name(),
                &sources,
                self.registry.gateway_url(),
                false,
                |value| normalize::parse_history(value, &username),
            )
            .await;

        match outcome {
            Outcome::Success { payload, .. } => Ok(payload),
            Outcome::Failure(failures) => Err(FetchError::Exhausted {
                resource: resource.name(),
                failures,
            }),
        }
    }

    /// Runs the growth / changes / rolling-average sub-queries for one
    /// account concurrently. Partial failure degrades individual metrics to
    /// `None`; the call itself never fails.
    pub async fn enrich_profile(&self, username: &str) -> ProfileAnalytics {
        analytics::enrich_profile(
            self.executor.http(),
            &self.config.analytics_url,
            self.analytics_timeout(),
            username,
        )
        .await
    }

    /// Enriches many accounts with at most `limit` in flight.
    pub async fn enrich_profiles(
        &self,
        usernames: &[String],
        limit: usize,
    ) -> Vec<ProfileAnalytics> {
        analytics::enrich_profiles(
            self.executor.http(),
            &self.config.analytics_url,
            self.analytics_timeout(),
            usernames,
            limit,
        )
        .await
    }

    /// Probes the logic and analytics services' `/health` endpoints
    /// concurrently. Total: unreachable services report as `offline`.
    pub async fn service_status(&self) -> ServiceStatusReport {
        let timeout = Duration::from_secs(HEALTH_TIMEOUT_SECS);
        let (logic, analytics) = tokio::join!(
            status::probe_service(self.executor.http(), &self.config.logic_url, timeout),
            status::probe_service(self.executor.http(), &self.config.analytics_url, timeout),
        );
        ServiceStatusReport {
            timestamp: Utc::now(),
            logic,
            analytics,
        }
    }

    fn analytics_timeout(&self) -> Duration {
        Duration::from_secs(self.config.analytics_timeout_secs)
    }

    fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.config.listing_timeout_secs)
    }

    fn gateway_url(&self) -> &str {
        &self.config.gateway_url
    }

    fn http(&self) -> &reqwest::Client {
        self.executor.http()
    }
}
