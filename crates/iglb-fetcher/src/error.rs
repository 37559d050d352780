use thiserror::Error;

use crate::executor::SourceFailure;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 2xx but the body could not be read as the expected JSON shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Every configured source and transport variant failed for a resource.
    ///
    /// Absorbed by the degradation policy for the leaderboard and trends
    /// entry points; surfaced only for the `Result`-returning operations.
    #[error("all sources exhausted for {resource} ({} attempts failed)", failures.len())]
    Exhausted {
        resource: String,
        failures: Vec<SourceFailure>,
    },

    /// User input failed validation. The only error class intended to reach
    /// the UI as a user-visible message.
    #[error("validation error: {0}")]
    Validation(String),
}

impl FetchError {
    /// `true` when the failure happened below HTTP (unreachable, timeout,
    /// connection reset). These advance the transport-variant ladder within
    /// a source; everything else fails the source attempt outright.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            FetchError::Http(e) => e.status().is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deserialize_err() -> FetchError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        FetchError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn deserialize_error_is_not_transport() {
        assert!(!deserialize_err().is_transport());
    }

    #[test]
    fn unexpected_status_is_not_transport() {
        let err = FetchError::UnexpectedStatus {
            status: 500,
            url: "http://x".to_owned(),
        };
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn connect_failure_is_transport() {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        assert!(FetchError::Http(err).is_transport());
    }
}
