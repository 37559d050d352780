//! Ordered source registry for the fallback chain.
//!
//! Pure data assembly: no network access happens here. For each logical
//! resource the registry yields candidate endpoints in explicit preference
//! order — same-origin gateway proxy first (fastest and immune to
//! cross-origin failures in trusted deployments), then the documented direct
//! service URL, then declared mirrors, then a last-resort public CORS relay
//! that is only consulted when `use_cors_proxy` is enabled (default off).

use std::time::Duration;

use iglb_core::FetcherConfig;

/// Transport strategy for a candidate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Same-origin API gateway.
    Proxy,
    /// Documented direct URL of the owning service.
    Direct,
    /// Declared alternate mirror of the owning service.
    AlternatePath,
    /// Public CORS-relay prefix wrapping a direct URL.
    CorsProxy,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Proxy => write!(f, "proxy"),
            Transport::Direct => write!(f, "direct"),
            Transport::AlternatePath => write!(f, "alternate-path"),
            Transport::CorsProxy => write!(f, "cors-proxy"),
        }
    }
}

/// One candidate endpoint for a logical resource.
///
/// For the [`Transport::CorsProxy`] transport, `base_url` is the relay
/// prefix and `path_template` the full wrapped target URL; for every other
/// transport `path_template` is an absolute path under `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub transport: Transport,
    pub base_url: String,
    pub path_template: String,
    pub timeout: Duration,
}

impl SourceDescriptor {
    /// Full request URL for the primary attempt against this source.
    #[must_use]
    pub fn request_url(&self) -> String {
        format!("{}{}", self.base_url, self.path_template)
    }

    /// Short identifier used in failure diagnostics and logs.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}:{}", self.transport, self.base_url)
    }
}

/// A logical resource the chain can fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Profiles,
    Accounts,
    Trends,
    ProfileHistory(String),
}

impl Resource {
    /// Stable name used in logs and exhaustion errors.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Resource::Profiles => "profiles".to_owned(),
            Resource::Accounts => "accounts".to_owned(),
            Resource::Trends => "trends".to_owned(),
            Resource::ProfileHistory(username) => format!("profile-history:{username}"),
        }
    }
}

/// Produces the ordered candidate list for each logical resource.
///
/// Built once from an immutable [`FetcherConfig`]; rebuilt per process
/// start, never persisted.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    config: FetcherConfig,
}

impl SourceRegistry {
    #[must_use]
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Gateway base used by the executor's local-proxy transport retry.
    #[must_use]
    pub fn gateway_url(&self) -> &str {
        &self.config.gateway_url
    }

    /// Ordered candidates for `resource`. May be empty when no base URLs are
    /// configured; the executor treats that as immediate exhaustion, not an
    /// error.
    #[must_use]
    pub fn sources_for(&self, resource: &Resource) -> Vec<SourceDescriptor> {
        let timeout = Duration::from_secs(self.config.listing_timeout_secs);
        let (gateway_path, service_path, service_base) = match resource {
            Resource::Profiles => (
                "/api/leaderboard".to_owned(),
                "/api/v1/profiles".to_owned(),
                &self.config.logic_url,
            ),
            Resource::Accounts => (
                "/api/accounts".to_owned(),
                "/api/v1/accounts".to_owned(),
                &self.config.logic_url,
            ),
            // The analytics service owns trend aggregation; the logic
            // service's profile listing (with embedded history) is the
            // schema-mapped fallback behind it.
            Resource::Trends => (
                "/api/trends".to_owned(),
                "/api/stats/trends".to_owned(),
                &self.config.analytics_url,
            ),
            Resource::ProfileHistory(username) => (
                format!("/api/profile/{username}"),
                format!("/api/v1/profiles/history/{username}"),
                &self.config.logic_url,
            ),
        };

        let mut sources = Vec::new();

        if !self.config.gateway_url.is_empty() {
            sources.push(SourceDescriptor {
                transport: Transport::Proxy,
                base_url: self.config.gateway_url.clone(),
                path_template: gateway_path,
                timeout,
            });
        }

        if !service_base.is_empty() {
            sources.push(SourceDescriptor {
                transport: Transport::Direct,
                base_url: service_base.clone(),
                path_template: service_path.clone(),
                timeout,
            });
        }

        // Trends can also be derived from the logic service's profile
        // listing when the analytics service is down.
        if matches!(resource, Resource::Trends) && !self.config.logic_url.is_empty() {
            sources.push(SourceDescriptor {
                transport: Transport::Direct,
                base_url: self.config.logic_url.clone(),
                path_template: "/api/v1/profiles".to_owned(),
                timeout,
            });
        }

        let mirror_path = match resource {
            Resource::Trends => "/api/v1/profiles".to_owned(),
            _ => service_path.clone(),
        };
        for mirror in &self.config.mirror_urls {
            sources.push(SourceDescriptor {
                transport: Transport::AlternatePath,
                base_url: mirror.clone(),
                path_template: mirror_path.clone(),
                timeout,
            });
        }

        if self.config.use_cors_proxy && !self.config.cors_proxy_url.is_empty() {
            let wrapped_base = match resource {
                Resource::Trends => &self.config.logic_url,
                _ => service_base,
            };
            let wrapped_path = match resource {
                Resource::Trends => "/api/v1/profiles".to_owned(),
                _ => service_path,
            };
            if !wrapped_base.is_empty() {
                sources.push(SourceDescriptor {
                    transport: Transport::CorsProxy,
                    base_url: self.config.cors_proxy_url.clone(),
                    path_template: format!("{wrapped_base}{wrapped_path}"),
                    timeout,
                });
            }
        }

        sources
    }
}
