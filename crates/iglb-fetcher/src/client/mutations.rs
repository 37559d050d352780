//! Mutations against the gateway: account submission, collection triggers,
//! and the moderation actions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::LeaderboardClient;
use crate::error::FetchError;

/// Collection runs cover every tracked account and are allowed to take much
/// longer than a listing call.
const SCRAPE_TIMEOUT_SECS: u64 = 30;

/// Moderation decision on a pending or tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Approve,
    Reject,
    Remove,
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminAction::Approve => write!(f, "approve"),
            AdminAction::Reject => write!(f, "reject"),
            AdminAction::Remove => write!(f, "remove"),
        }
    }
}

/// Acknowledgement body returned by the gateway for mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl LeaderboardClient {
    /// Submits a new account for moderation.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Validation`] for a blank or too-short username, or
    ///   when the gateway rejects the submission (already tracked, already
    ///   pending). This is the one error class meant for direct display.
    /// - [`FetchError::Http`] / [`FetchError::UnexpectedStatus`] on
    ///   transport or server failure.
    pub async fn submit_account(
        &self,
        username: &str,
        submitter: &str,
    ) -> Result<MutationAck, FetchError> {
        let username = normalize_username(username)?;
        if username.len() < 3 {
            return Err(FetchError::Validation(
                "username must be at least 3 characters".to_owned(),
            ));
        }
        let submitter = if submitter.trim().is_empty() {
            "Anonymous"
        } else {
            submitter.trim()
        };

        let url = format!("{}/api/submit", self.gateway_url());
        let body = serde_json::json!({ "username": username, "submitter": submitter });
        self.post_ack(&url, &body, self.listing_timeout()).await
    }

    /// Triggers a fresh collection run on the logic service via the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] or [`FetchError::UnexpectedStatus`] when
    /// the trigger fails; the chain's degradation policy does not apply to
    /// mutations.
    pub async fn trigger_scrape(&self) -> Result<MutationAck, FetchError> {
        let url = format!("{}/api/scrape", self.gateway_url());
        self.post_ack(
            &url,
            &serde_json::json!({}),
            Duration::from_secs(SCRAPE_TIMEOUT_SECS),
        )
        .await
    }

    /// Applies a moderation decision to an account.
    ///
    /// # Errors
    ///
    /// Same classes as [`LeaderboardClient::submit_account`].
    pub async fn admin_action(
        &self,
        action: AdminAction,
        username: &str,
    ) -> Result<MutationAck, FetchError> {
        let username = normalize_username(username)?;
        let url = format!("{}/api/admin/{action}", self.gateway_url());
        let body = serde_json::json!({ "username": username });
        self.post_ack(&url, &body, self.listing_timeout()).await
    }

    async fn post_ack(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<MutationAck, FetchError> {
        let response = self
            .http()
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST {
            // The gateway answers 400 with a displayable reason; surface it
            // through the same validation channel as local checks.
            let reason = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.or(b.message))
                .unwrap_or_else(|| "request rejected".to_owned());
            return Err(FetchError::Validation(reason));
        }

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
}

/// Normalizes user-entered usernames: trim, strip a leading `@`, lowercase.
///
/// # Errors
///
/// Returns [`FetchError::Validation`] when nothing is left after
/// normalization.
pub(crate) fn normalize_username(raw: &str) -> Result<String, FetchError> {
    let username = raw.trim().trim_start_matches('@').to_lowercase();
    if username.is_empty() {
        return Err(FetchError::Validation("username is required".to_owned()));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_username_strips_at_and_lowercases() {
        assert_eq!(normalize_username(" @Lil_Miquela ").unwrap(), "lil_miquela");
    }

    #[test]
    fn normalize_username_rejects_empty() {
        let err = normalize_username("   ").unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
    }

    #[test]
    fn normalize_username_rejects_bare_at() {
        assert!(normalize_username("@").is_err());
    }

    #[test]
    fn admin_action_display_matches_endpoint_segments() {
        assert_eq!(AdminAction::Approve.to_string(), "approve");
        assert_eq!(AdminAction::Reject.to_string(), "reject");
        assert_eq!(AdminAction::Remove.to_string(), "remove");
    }
}
