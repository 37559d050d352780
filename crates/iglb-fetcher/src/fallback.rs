//! Degradation policy: the deterministic substitute dataset returned when a
//! fallback chain is exhausted.
//!
//! The dataset lives in `fixtures/degraded.yaml` as named, versioned data —
//! never intermixed with live-data code paths. It is shaped identically to a
//! normal success payload and tagged with a generation timestamp of "now",
//! which is what makes `fetch_leaderboard` and `fetch_trends` total from the
//! caller's perspective.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use iglb_core::{Leaderboard, Profile, TrendPoint, TrendSeries};
use serde::Deserialize;

use crate::types::parse_timestamp;

const DEGRADED_FIXTURE: &str = include_str!("../fixtures/degraded.yaml");

#[derive(Debug, Deserialize)]
struct DegradedDataset {
    version: u32,
    profiles: Vec<DegradedProfile>,
    trends: Vec<DegradedSeries>,
}

#[derive(Debug, Deserialize)]
struct DegradedProfile {
    username: String,
    bio: String,
    follower_count: i64,
    follower_change: i64,
    profile_image_reference: String,
}

#[derive(Debug, Deserialize)]
struct DegradedSeries {
    username: String,
    points: Vec<DegradedPoint>,
}

#[derive(Debug, Deserialize)]
struct DegradedPoint {
    timestamp: String,
    follower_count: i64,
}

impl DegradedDataset {
    fn empty() -> Self {
        Self {
            version: 0,
            profiles: Vec::new(),
            trends: Vec::new(),
        }
    }
}

/// Parses the embedded fixture once. A malformed fixture degrades to an
/// empty dataset rather than panicking; the fixture tests below keep that
/// path from going unnoticed in development.
fn dataset() -> &'static DegradedDataset {
    static DATASET: OnceLock<DegradedDataset> = OnceLock::new();
    DATASET.get_or_init(|| match serde_yaml::from_str(DEGRADED_FIXTURE) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(error = %err, "degraded fixture failed to parse; substituting empty dataset");
            DegradedDataset::empty()
        }
    })
}

/// Version of the embedded dataset, for logging substitute payloads.
#[must_use]
pub fn dataset_version() -> u32 {
    dataset().version
}

/// The substitute leaderboard, ranked like any live snapshot and stamped
/// with the caller's "now".
#[must_use]
pub fn degraded_leaderboard(updated_at: DateTime<Utc>) -> Leaderboard {
    let profiles = dataset()
        .profiles
        .iter()
        .map(|p| Profile {
            username: p.username.clone(),
            bio: p.bio.clone(),
            follower_count: p.follower_count,
            follower_change: p.follower_change,
            profile_image_reference: p.profile_image_reference.clone(),
            rank: 0,
        })
        .collect();
    Leaderboard::assemble(profiles, updated_at)
}

/// The substitute trend series. Timestamps are the fixture's fixed values,
/// keeping the payload deterministic across calls.
#[must_use]
pub fn degraded_trends() -> Vec<TrendSeries> {
    dataset()
        .trends
        .iter()
        .map(|series| {
            let points = series
                .points
                .iter()
                .filter_map(|p| {
                    Some(TrendPoint {
                        timestamp: parse_timestamp(&p.timestamp)?,
                        follower_count: p.follower_count,
                    })
                })
                .collect();
            TrendSeries::from_points(&series.username, points)
        })
        .collect()
}
