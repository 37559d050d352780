//! Per-account analytics enrichment.
//!
//! The growth, changes, and rolling-average sub-queries for one username are
//! issued concurrently under the shared analytics timeout, and a missing
//! sub-result degrades that one metric to `None` rather than failing the
//! whole enrichment. Batch enrichment fans out over usernames with a bounded
//! concurrency limit.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Growth figures as served by `/api/v1/analytics/growth/{username}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    #[serde(default)]
    pub daily_growth: i64,
    #[serde(default)]
    pub weekly_growth: i64,
    #[serde(default)]
    pub monthly_growth: i64,
    #[serde(default)]
    pub growth_rate: f64,
}

#[derive(Debug, Deserialize)]
struct ChangesResponse {
    #[serde(default, alias = "follower_change")]
    change: i64,
}

#[derive(Debug, Deserialize)]
struct RollingAverageResponse {
    #[serde(default)]
    rolling_average: f64,
}

/// Enrichment result for one account. Each metric is independently
/// `None` when its sub-query failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAnalytics {
    pub username: String,
    pub growth: Option<GrowthStats>,
    pub changes: Option<i64>,
    pub rolling_average: Option<f64>,
}

/// Runs the three sub-queries for `username` concurrently (fan-out/fan-in).
pub(crate) async fn enrich_profile(
    http: &Client,
    analytics_url: &str,
    timeout: Duration,
    username: &str,
) -> ProfileAnalytics {
    let growth_url = format!("{analytics_url}/api/v1/analytics/growth/{username}");
    let changes_url = format!("{analytics_url}/api/v1/analytics/changes/{username}");
    let rolling_url = format!("{analytics_url}/api/v1/analytics/rolling-average/{username}");

    let (growth, changes, rolling_average) = tokio::join!(
        fetch_metric::<GrowthStats>(http, &growth_url, timeout),
        fetch_metric::<ChangesResponse>(http, &changes_url, timeout),
        fetch_metric::<RollingAverageResponse>(http, &rolling_url, timeout),
    );

    ProfileAnalytics {
        username: username.to_owned(),
        growth: degrade(growth, username, "growth"),
        changes: degrade(changes, username, "changes").map(|c| c.change),
        rolling_average: degrade(rolling_average, username, "rolling-average")
            .map(|r| r.rolling_average),
    }
}

/// Enriches many accounts with at most `limit` usernames in flight, keeping
/// input order in the output.
pub(crate) async fn enrich_profiles(
    http: &Client,
    analytics_url: &str,
    timeout: Duration,
    usernames: &[String],
    limit: usize,
) -> Vec<ProfileAnalytics> {
    stream::iter(usernames)
        .map(|username| enrich_profile(http, analytics_url, timeout, username))
        .buffered(limit.max(1))
        .collect()
        .await
}

fn degrade<T>(result: Result<T, FetchError>, username: &str, metric: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(username, metric, error = %err, "analytics sub-query degraded to null");
            None
        }
    }
}

async fn fetch_metric<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    timeout: Duration,
) -> Result<T, FetchError> {
    let response = http.get(url).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
        context: url.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_stats_deserialize_with_defaults() {
        let stats: GrowthStats =
            serde_json::from_value(serde_json::json!({"weekly_growth": 120})).unwrap();
        assert_eq!(stats.weekly_growth, 120);
        assert_eq!(stats.daily_growth, 0);
        assert!((stats.growth_rate).abs() < 1e-9);
    }

    #[test]
    fn changes_response_accepts_synonym() {
        let changes: ChangesResponse =
            serde_json::from_value(serde_json::json!({"follower_change": -4})).unwrap();
        assert_eq!(changes.change, -4);
    }
}
