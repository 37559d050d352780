//! Canonical leaderboard and trend model shared by the fetch core and its
//! callers.
//!
//! Every successful fetch produces a fresh [`Leaderboard`] snapshot; nothing
//! in this module mutates an existing snapshot in place. Ranks from upstream
//! services are never trusted — [`Leaderboard::assemble`] always recomputes
//! them from follower counts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One ranked account on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique key. Always stored without a leading `@`.
    pub username: String,
    /// Empty string when the upstream source has no bio (never null).
    pub bio: String,
    pub follower_count: i64,
    /// Delta since the previous observation; `0` when unknown.
    pub follower_change: i64,
    /// Opaque image reference: absolute URL, `md5:<hash>`/`db:<hash>` cache
    /// token, or bare id. The core never interprets it.
    pub profile_image_reference: String,
    /// 1-based position, recomputed on every assemble.
    pub rank: u32,
}

/// Immutable leaderboard snapshot.
///
/// `updated_at` is the time of generation, not of underlying data capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub profiles: Vec<Profile>,
    pub updated_at: DateTime<Utc>,
}

impl Leaderboard {
    /// Builds a snapshot from unranked profiles: stable sort descending by
    /// `follower_count` (ties keep original source order), then ranks
    /// reassigned 1..N.
    #[must_use]
    pub fn assemble(mut profiles: Vec<Profile>, updated_at: DateTime<Utc>) -> Self {
        profiles.sort_by(|a, b| b.follower_count.cmp(&a.follower_count));
        for (idx, profile) in profiles.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let rank = (idx + 1) as u32;
            profile.rank = rank;
        }
        Self {
            profiles,
            updated_at,
        }
    }
}

/// A single observation in an account's follower history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub follower_count: i64,
}

/// Follower history for one account as parallel ordered sequences.
///
/// Invariants: `timestamps.len() == follower_counts.len()` and timestamps
/// are non-decreasing. Both are guaranteed by [`TrendSeries::from_points`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub username: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub follower_counts: Vec<i64>,
}

impl TrendSeries {
    /// Builds a series from unordered points: stable sort ascending by
    /// timestamp, then split into the parallel vectors.
    #[must_use]
    pub fn from_points(username: &str, mut points: Vec<TrendPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        let timestamps = points.iter().map(|p| p.timestamp).collect();
        let follower_counts = points.iter().map(|p| p.follower_count).collect();
        Self {
            username: username.to_owned(),
            timestamps,
            follower_counts,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Growth over the given lookback window, measured against the latest
    /// sample whose timestamp is at or before `now - window`.
    ///
    /// When no sample is that old, the oldest available sample is used
    /// instead (graceful degradation rather than an "insufficient data"
    /// error). Returns `None` only when the series is empty.
    #[must_use]
    pub fn growth_delta(&self, window: Duration, now: DateTime<Utc>) -> Option<GrowthDelta> {
        let last_ts = *self.timestamps.last()?;
        let last_count = *self.follower_counts.last()?;

        let cutoff = now - window;
        let reference_idx = self
            .timestamps
            .iter()
            .rposition(|ts| *ts <= cutoff)
            .unwrap_or(0);
        let reference_ts = self.timestamps[reference_idx];
        let reference_count = self.follower_counts[reference_idx];

        let value = last_count - reference_count;

        #[allow(clippy::cast_precision_loss)]
        let percentage = if reference_count == 0 {
            0.0
        } else {
            value as f64 / reference_count as f64 * 100.0
        };

        let elapsed_hours = (last_ts - reference_ts).num_minutes() as f64 / 60.0;
        #[allow(clippy::cast_precision_loss)]
        let hourly_rate = if elapsed_hours > 0.0 {
            value as f64 / elapsed_hours
        } else {
            0.0
        };

        Some(GrowthDelta {
            value,
            percentage,
            hourly_rate,
        })
    }
}

/// Derived growth figures for one account over a lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthDelta {
    /// Absolute follower change: last sample minus reference sample.
    pub value: i64,
    /// `value / reference * 100`; `0.0` when the reference count is zero.
    pub percentage: f64,
    /// `value / elapsed_hours` between reference and last sample.
    pub hourly_rate: f64,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
