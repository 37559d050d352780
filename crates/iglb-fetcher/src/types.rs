//! Raw wire shapes returned by the upstream services.
//!
//! ## Observed shapes
//!
//! Different backends return "the same" resource in different envelopes, and
//! the chain accepts whichever source answers first, so every listing type
//! here is an untagged union over the known variants.
//!
//! ### Profile listings
//! - The gateway wraps profiles in an envelope:
//!   `{"profiles": [...], "timestamp": "...", "total": N}`.
//! - The logic service returns a bare array: `[{...}, ...]`.
//!
//! ### Profile records
//! Field names differ per backend: follower counts arrive as `followers`
//! or `follower_count`, bios as `bio` or `biography`, and image references
//! as `profile_pic_url`, `profile_image`, or `profile_image_reference`.
//! The synonym mapping is declared here with serde aliases so it stays
//! total; unknown fields are dropped silently. Records without a username
//! are unusable and get dropped (with a warning) during normalization.
//!
//! ### Timestamps
//! The legacy services emit `datetime.now().isoformat()` — a naive local
//! timestamp without a zone suffix — while newer ones emit RFC 3339.
//! [`parse_timestamp`] accepts both, treating naive values as UTC.
//!
//! ### History / trends
//! Per-account history is `{"history": [{"timestamp", "follower_count"}]}`
//! from the logic service, or a full profile record with an embedded
//! `history` array from the gateway's profile-detail path. The analytics
//! service wraps aggregated trends as
//! `{"trends": [{"username", "data_points": [...]}]}`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// One profile record, with field synonyms declared as aliases.
#[derive(Debug, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, alias = "followers")]
    pub follower_count: i64,

    #[serde(default, alias = "biography")]
    pub bio: Option<String>,

    #[serde(default)]
    pub follower_change: Option<i64>,

    #[serde(
        default,
        alias = "profile_pic_url",
        alias = "profile_image",
        alias = "profile_img_url"
    )]
    pub profile_image_reference: Option<String>,

    /// Embedded follower history; present on logic-service records and on
    /// the gateway's profile-detail response.
    #[serde(default)]
    pub history: Vec<RawTrendPoint>,
}

/// A profile listing in either known envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawListing {
    Envelope { profiles: Vec<RawProfile> },
    Bare(Vec<RawProfile>),
}

impl RawListing {
    #[must_use]
    pub fn into_profiles(self) -> Vec<RawProfile> {
        match self {
            RawListing::Envelope { profiles } | RawListing::Bare(profiles) => profiles,
        }
    }
}

/// One observation inside a history or trend payload.
#[derive(Debug, Deserialize)]
pub struct RawTrendPoint {
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default, alias = "followers")]
    pub follower_count: i64,
}

/// Per-account history in any known envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawHistoryPayload {
    Envelope { history: Vec<RawTrendPoint> },
    Profile(RawProfile),
    Bare(Vec<RawTrendPoint>),
}

/// One aggregated trend entry from the analytics service.
#[derive(Debug, Deserialize)]
pub struct RawTrendEntry {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, alias = "history")]
    pub data_points: Vec<RawTrendPoint>,
}

/// Trend payload: the analytics envelope, or any profile listing whose
/// embedded histories the normalizer can derive series from.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTrendsPayload {
    Envelope { trends: Vec<RawTrendEntry> },
    Listing(RawListing),
}

/// A single tracked account name, bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAccount {
    Name(String),
    Entry { username: String },
}

impl RawAccount {
    #[must_use]
    pub fn into_username(self) -> String {
        match self {
            RawAccount::Name(username) | RawAccount::Entry { username } => username,
        }
    }
}

/// An accounts listing in either known envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAccountsPayload {
    Envelope { accounts: Vec<RawAccount> },
    Bare(Vec<RawAccount>),
}

impl RawAccountsPayload {
    #[must_use]
    pub fn into_accounts(self) -> Vec<RawAccount> {
        match self {
            RawAccountsPayload::Envelope { accounts } | RawAccountsPayload::Bare(accounts) => {
                accounts
            }
        }
    }
}

/// Parse an upstream timestamp, accepting RFC 3339 or the legacy naive
/// `isoformat()` shape (assumed UTC). Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
