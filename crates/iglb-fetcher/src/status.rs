//! Connectivity probes for the collaborating services.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    /// Reachable but answering with an error status.
    Error,
    Offline,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Online => write!(f, "online"),
            ServiceState::Error => write!(f, "error"),
            ServiceState::Offline => write!(f, "offline"),
        }
    }
}

/// Result of probing one service's `/health` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceProbe {
    pub status: ServiceState,
    pub message: String,
    pub url: String,
}

/// Connectivity snapshot across the logic and analytics services.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatusReport {
    pub timestamp: DateTime<Utc>,
    pub logic: ServiceProbe,
    pub analytics: ServiceProbe,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    message: Option<String>,
}

/// Probes one service. Total: failures degrade to `error`/`offline` probes,
/// they never propagate.
pub(crate) async fn probe_service(http: &Client, base_url: &str, timeout: Duration) -> ServiceProbe {
    let url = format!("{base_url}/health");
    match http.get(&url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                let message = response
                    .json::<HealthBody>()
                    .await
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| "Service responding".to_owned());
                ServiceProbe {
                    status: ServiceState::Online,
                    message,
                    url: base_url.to_owned(),
                }
            } else {
                ServiceProbe {
                    status: ServiceState::Error,
                    message: format!("HTTP {}", status.as_u16()),
                    url: base_url.to_owned(),
                }
            }
        }
        Err(err) => ServiceProbe {
            status: ServiceState::Offline,
            message: err.to_string(),
            url: base_url.to_owned(),
        },
    }
}
