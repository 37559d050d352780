//! Fallback chain executor.
//!
//! Tries the registry's sources strictly in order and returns the first
//! structurally valid response. There is no racing across sources: lower
//! priority endpoints see no load unless everything above them failed.
//!
//! Within a single source, transport-level failures (unreachable, timeout,
//! connection reset) descend a variant ladder: the standard request, the
//! same path re-routed through the local gateway proxy, an alternate
//! `/api` / `/api/v1` prefix shape, and finally an opaque probe whose body
//! is never read — a completed opaque probe stands in for an empty
//! collection, since its payload cannot be parsed. HTTP error statuses and
//! JSON shape failures do not descend the ladder; they fail the source
//! attempt outright and advance the chain.

use std::time::Duration;

use reqwest::Client;

use crate::error::FetchError;
use crate::sources::{SourceDescriptor, Transport};

/// Diagnostic record for one failed attempt, kept only until some attempt
/// succeeds.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    /// Source label plus the variant that failed, e.g. `direct:http://x[standard]`.
    pub source: String,
    pub error: String,
}

/// Outcome of one chain execution. Internal only: the public entry points
/// convert `Failure` into either the degraded dataset or a
/// [`FetchError::Exhausted`].
pub(crate) enum Outcome<T> {
    Success { payload: T, source: String },
    Failure(Vec<SourceFailure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptMode {
    Standard,
    LocalProxy,
    AlternatePrefix,
    Opaque,
}

impl AttemptMode {
    fn label(self) -> &'static str {
        match self {
            AttemptMode::Standard => "standard",
            AttemptMode::LocalProxy => "local-proxy",
            AttemptMode::AlternatePrefix => "alternate-path",
            AttemptMode::Opaque => "opaque",
        }
    }
}

/// Executes fallback chains over a shared HTTP client.
///
/// The client carries no global timeout; each attempt is bounded by the
/// source's own timeout, so one slow endpoint cancels only its own attempt,
/// never the chain.
pub(crate) struct ChainExecutor {
    http: Client,
}

impl ChainExecutor {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { http })
    }

    /// Shared client for callers issuing non-chained requests (analytics
    /// enrichment, mutations, health probes).
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Runs the chain for `resource` over `sources`, parsing the first
    /// usable body with `parse`. An empty `sources` slice is immediate
    /// exhaustion. Collected failures are logged and discarded on success.
    pub async fn execute<T, F>(
        &self,
        resource: &str,
        sources: &[SourceDescriptor],
        proxy_base: &str,
        force_refresh: bool,
        parse: F,
    ) -> Outcome<T>
    where
        F: Fn(serde_json::Value) -> Result<T, serde_json::Error>,
    {
        let mut failures: Vec<SourceFailure> = Vec::new();

        for source in sources {
            let label = source.label();
            for (mode, url) in attempt_plans(source, proxy_base) {
                let attempt = format!("{label}[{}]", mode.label());

                let value = if mode == AttemptMode::Opaque {
                    match self.opaque_probe(&url, source.timeout).await {
                        Ok(()) => serde_json::Value::Array(Vec::new()),
                        Err(err) => {
                            tracing::warn!(resource, source = %attempt, %url, error = %err, "opaque probe failed");
                            failures.push(SourceFailure {
                                source: attempt,
                                error: err.to_string(),
                            });
                            break;
                        }
                    }
                } else {
                    match self.attempt_json(&url, source.timeout, force_refresh).await {
                        Ok(value) => value,
                        Err(err) => {
                            let transport = err.is_transport();
                            tracing::warn!(resource, source = %attempt, %url, error = %err, "source attempt failed");
                            failures.push(SourceFailure {
                                source: attempt,
                                error: err.to_string(),
                            });
                            if transport {
                                // Only sub-HTTP failures descend the ladder.
                                continue;
                            }
                            break;
                        }
                    }
                };

                match parse(value) {
                    Ok(payload) => {
                        tracing::info!(resource, source = %attempt, "chain resolved");
                        return Outcome::Success {
                            payload,
                            source: attempt,
                        };
                    }
                    Err(err) => {
                        tracing::warn!(resource, source = %attempt, %url, error = %err, "response shape not recognized");
                        failures.push(SourceFailure {
                            source: attempt,
                            error: format!("shape error: {err}"),
                        });
                        break;
                    }
                }
            }
        }

        tracing::warn!(
            resource,
            attempts = failures.len(),
            "all sources exhausted"
        );
        Outcome::Failure(failures)
    }

    /// One bounded GET returning the parsed JSON body.
    ///
    /// Caching is disabled on every attempt; forced refreshes additionally
    /// carry a `_t` cache-busting query parameter for CDNs that ignore
    /// request headers.
    async fn attempt_json(
        &self,
        url: &str,
        timeout: Duration,
        force_refresh: bool,
    ) -> Result<serde_json::Value, FetchError> {
        let url = if force_refresh {
            cache_busted(url)
        } else {
            url.to_owned()
        };

        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
            context: url,
            source: e,
        })
    }

    /// Degraded last-resort probe: the response body is never read, so a
    /// completed request proves only that the endpoint is alive. Callers
    /// substitute an empty collection for the unreadable payload.
    async fn opaque_probe(&self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        self.http
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        Ok(())
    }
}

/// Builds the transport-variant ladder for one source.
///
/// The relay transport wraps a full target URL, so re-routing or re-prefixing
/// it is meaningless; it gets only the standard attempt and the opaque probe.
/// A proxy source is itself the local proxy, so it skips that rung.
fn attempt_plans(source: &SourceDescriptor, proxy_base: &str) -> Vec<(AttemptMode, String)> {
    let mut plans = vec![(AttemptMode::Standard, source.request_url())];

    if source.transport != Transport::CorsProxy {
        if source.transport != Transport::Proxy && !proxy_base.is_empty() {
            plans.push((
                AttemptMode::LocalProxy,
                format!("{proxy_base}{}", source.path_template),
            ));
        }
        if let Some(alternate) = swap_api_prefix(&source.path_template) {
            plans.push((
                AttemptMode::AlternatePrefix,
                format!("{}{alternate}", source.base_url),
            ));
        }
    }

    plans.push((AttemptMode::Opaque, source.request_url()));
    plans
}

/// Swaps between the two path shapes some backends expose for the same
/// resource: `/api/v1/<rest>` and `/api/<rest>`.
fn swap_api_prefix(path: &str) -> Option<String> {
    if let Some(rest) = path.strip_prefix("/api/v1/") {
        Some(format!("/api/{rest}"))
    } else {
        path.strip_prefix("/api/")
            .map(|rest| format!("/api/v1/{rest}"))
    }
}

/// Appends the `_t` cache-busting parameter used on forced refreshes.
fn cache_busted(url: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed
                .query_pairs_mut()
                .append_pair("_t", &millis.to_string());
            parsed.to_string()
        }
        Err(_) => {
            // Relay-wrapped targets are not always valid URLs on their own.
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}_t={millis}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(transport: Transport, base: &str, path: &str) -> SourceDescriptor {
        SourceDescriptor {
            transport,
            base_url: base.to_owned(),
            path_template: path.to_owned(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn swap_api_prefix_both_directions() {
        assert_eq!(
            swap_api_prefix("/api/v1/profiles").as_deref(),
            Some("/api/profiles")
        );
        assert_eq!(
            swap_api_prefix("/api/leaderboard").as_deref(),
            Some("/api/v1/leaderboard")
        );
        assert_eq!(swap_api_prefix("/health"), None);
    }

    #[test]
    fn direct_source_gets_full_ladder() {
        let s = source(Transport::Direct, "http://logic.test", "/api/v1/profiles");
        let plans = attempt_plans(&s, "http://gateway.test");
        let modes: Vec<AttemptMode> = plans.iter().map(|(m, _)| *m).collect();
        assert_eq!(
            modes,
            vec![
                AttemptMode::Standard,
                AttemptMode::LocalProxy,
                AttemptMode::AlternatePrefix,
                AttemptMode::Opaque,
            ]
        );
        assert_eq!(plans[1].1, "http://gateway.test/api/v1/profiles");
        assert_eq!(plans[2].1, "http://logic.test/api/profiles");
    }

    #[test]
    fn proxy_source_skips_local_proxy_rung() {
        let s = source(Transport::Proxy, "http://gateway.test", "/api/leaderboard");
        let plans = attempt_plans(&s, "http://gateway.test");
        let modes: Vec<AttemptMode> = plans.iter().map(|(m, _)| *m).collect();
        assert_eq!(
            modes,
            vec![
                AttemptMode::Standard,
                AttemptMode::AlternatePrefix,
                AttemptMode::Opaque,
            ]
        );
    }

    #[test]
    fn relay_source_gets_only_standard_and_opaque() {
        let s = source(
            Transport::CorsProxy,
            "https://relay.test/?",
            "http://logic.test/api/v1/profiles",
        );
        let plans = attempt_plans(&s, "http://gateway.test");
        let modes: Vec<AttemptMode> = plans.iter().map(|(m, _)| *m).collect();
        assert_eq!(modes, vec![AttemptMode::Standard, AttemptMode::Opaque]);
    }

    #[test]
    fn cache_busted_appends_query_parameter() {
        let url = cache_busted("http://gateway.test/api/leaderboard");
        assert!(url.starts_with("http://gateway.test/api/leaderboard?_t="));

        let with_query = cache_busted("http://gateway.test/api/leaderboard?x=1");
        assert!(with_query.contains("x=1"));
        assert!(with_query.contains("_t="));
    }
}
