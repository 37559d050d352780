//! Normalization from raw wire shapes to the canonical model.
//!
//! Whatever envelope a source answered with, the output contract is total:
//! ranks recomputed, `bio` defaulting to `""` and `follower_change` to `0`
//! (never null), negative counts clamped, unusable records dropped.

use chrono::{DateTime, Utc};
use iglb_core::{Leaderboard, Profile, TrendPoint, TrendSeries};

use crate::types::{
    parse_timestamp, RawAccount, RawAccountsPayload, RawHistoryPayload, RawListing, RawProfile,
    RawTrendPoint, RawTrendsPayload,
};

/// Parses any accepted profile-listing shape into a ranked [`Leaderboard`].
///
/// # Errors
///
/// Returns the underlying `serde_json::Error` when the payload matches no
/// known listing shape; the executor attaches the request URL as context.
pub fn parse_leaderboard(
    value: serde_json::Value,
    updated_at: DateTime<Utc>,
) -> Result<Leaderboard, serde_json::Error> {
    let listing: RawListing = serde_json::from_value(value)?;
    let profiles: Vec<Profile> = listing
        .into_profiles()
        .into_iter()
        .filter_map(normalize_profile)
        .collect();
    Ok(Leaderboard::assemble(profiles, updated_at))
}

/// Parses any accepted trends shape into per-account series.
///
/// Accepts the analytics `{"trends": [...]}` envelope as well as any profile
/// listing, deriving series from embedded histories in the latter case.
/// Accounts without history are skipped (an account with no samples has no
/// trend to chart).
///
/// # Errors
///
/// Returns the underlying `serde_json::Error` when the payload matches no
/// known shape.
pub fn parse_trends(value: serde_json::Value) -> Result<Vec<TrendSeries>, serde_json::Error> {
    let payload: RawTrendsPayload = serde_json::from_value(value)?;
    let series = match payload {
        RawTrendsPayload::Envelope { trends } => trends
            .into_iter()
            .filter_map(|entry| {
                let Some(username) = entry.username else {
                    tracing::warn!("dropping trend entry without username");
                    return None;
                };
                let points = collect_points(entry.data_points);
                if points.is_empty() {
                    return None;
                }
                Some(TrendSeries::from_points(&username, points))
            })
            .collect(),
        RawTrendsPayload::Listing(listing) => listing
            .into_profiles()
            .into_iter()
            .filter_map(|profile| {
                let username = profile.username.as_deref()?.to_owned();
                let points = collect_points(profile.history);
                if points.is_empty() {
                    return None;
                }
                Some(TrendSeries::from_points(&username, points))
            })
            .collect(),
    };
    Ok(series)
}

/// Parses any accepted per-account history shape into a [`TrendSeries`].
///
/// # Errors
///
/// Returns the underlying `serde_json::Error` when the payload matches no
/// known shape.
pub fn parse_history(
    value: serde_json::Value,
    username: &str,
) -> Result<TrendSeries, serde_json::Error> {
    let payload: RawHistoryPayload = serde_json::from_value(value)?;
    let points = match payload {
        RawHistoryPayload::Envelope { history } | RawHistoryPayload::Bare(history) => {
            collect_points(history)
        }
        RawHistoryPayload::Profile(profile) => collect_points(profile.history),
    };
    Ok(TrendSeries::from_points(username, points))
}

/// Parses any accepted accounts shape into normalized usernames.
///
/// # Errors
///
/// Returns the underlying `serde_json::Error` when the payload matches no
/// known shape.
pub fn parse_accounts(value: serde_json::Value) -> Result<Vec<String>, serde_json::Error> {
    let payload: RawAccountsPayload = serde_json::from_value(value)?;
    Ok(payload
        .into_accounts()
        .into_iter()
        .map(RawAccount::into_username)
        .map(|name| name.trim().trim_start_matches('@').to_owned())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Maps one raw record to a canonical [`Profile`], or `None` when the record
/// carries no username. Rank is left at 0 here; [`Leaderboard::assemble`]
/// reassigns it.
fn normalize_profile(raw: RawProfile) -> Option<Profile> {
    let Some(username) = raw.username else {
        tracing::warn!("dropping profile record without username");
        return None;
    };
    let username = username.trim().trim_start_matches('@').to_owned();
    if username.is_empty() {
        tracing::warn!("dropping profile record with blank username");
        return None;
    }
    Some(Profile {
        username,
        bio: raw.bio.unwrap_or_default(),
        follower_count: raw.follower_count.max(0),
        follower_change: raw.follower_change.unwrap_or(0),
        profile_image_reference: raw.profile_image_reference.unwrap_or_default(),
        rank: 0,
    })
}

/// Converts raw observations into [`TrendPoint`]s, dropping any whose
/// timestamp cannot be parsed.
fn collect_points(raw: Vec<RawTrendPoint>) -> Vec<TrendPoint> {
    raw.into_iter()
        .filter_map(|point| {
            let raw_ts = point.timestamp?;
            let Some(timestamp) = parse_timestamp(&raw_ts) else {
                tracing::warn!(timestamp = %raw_ts, "dropping history point with unparsable timestamp");
                return None;
            };
            Some(TrendPoint {
                timestamp,
                follower_count: point.follower_count.max(0),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
