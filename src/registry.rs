//! Registry client
//!
//! Resolves the compatibility mode configured for a subject. The subject
//! endpoint (`/config/{subject}`) is asked first, then the global endpoint
//! (`/config`). If neither answers, resolution fails with
//! [`CompatError::RegistryUnavailable`]; a fallback mode is only ever used
//! when the caller opts in through [`WithFallback`].

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::config::RegistryConfig;
use crate::error::{CompatError, Result};
use crate::mode::CompatibilityMode;

/// Anything that can tell which mode applies to a subject
pub trait ModeSource {
    fn resolve(&self, subject: &str) -> Result<CompatibilityMode>;
}

/// A mode given up front (e.g. on the command line)
#[derive(Debug, Clone, Copy)]
pub struct FixedMode(pub CompatibilityMode);

impl ModeSource for FixedMode {
    fn resolve(&self, _subject: &str) -> Result<CompatibilityMode> {
        Ok(self.0)
    }
}

/// Outcome of asking one config endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    /// Endpoint answered with a body
    Body(String),
    /// Endpoint answered but has no config for this scope (HTTP 404)
    NotConfigured,
    /// Endpoint could not be reached or answered with an error
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    #[serde(rename = "compatibilityLevel", alias = "compatibility")]
    compatibility_level: String,
}

/// Extract the mode from a `/config` response body
pub fn parse_config_body(body: &str) -> std::result::Result<CompatibilityMode, String> {
    let response: ConfigResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected config response: {}", e))?;
    response
        .compatibility_level
        .parse()
        .map_err(|e: CompatError| e.to_string())
}

/// Subject endpoint first, then the global one.
///
/// `fetch` receives the endpoint as unencoded path segments relative to the
/// registry root (`["config", subject]`, then `["config"]`). The subject is
/// always a single segment, so `/`, `?` and `#` in it must be percent-encoded
/// by the caller when building the URL.
pub fn resolve_via<F>(subject: &str, mut fetch: F) -> Result<CompatibilityMode>
where
    F: FnMut(&[&str]) -> Fetch,
{
    let mut failures = Vec::new();

    for segments in [&["config", subject][..], &["config"][..]] {
        let path = segments.join("/");
        match fetch(segments) {
            Fetch::Body(body) => match parse_config_body(&body) {
                Ok(mode) => {
                    tracing::info!(subject, endpoint = %path, mode = %mode, "resolved compatibility mode");
                    return Ok(mode);
                }
                Err(reason) => {
                    tracing::warn!(endpoint = %path, %reason, "ignoring config response");
                    failures.push(format!("/{}: {}", path, reason));
                }
            },
            Fetch::NotConfigured => {
                tracing::debug!(endpoint = %path, "no compatibility configured");
                failures.push(format!("/{}: not configured", path));
            }
            Fetch::Failed(reason) => {
                tracing::warn!(endpoint = %path, %reason, "registry request failed");
                failures.push(format!("/{}: {}", path, reason));
            }
        }
    }

    Err(CompatError::RegistryUnavailable {
        subject: subject.to_string(),
        reason: failures.join("; "),
    })
}

/// Blocking HTTP client for a Confluent-style schema registry
#[derive(Clone)]
pub struct HttpRegistry {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint, each segment percent-encoded on its own
    pub fn endpoint_url(&self, segments: &[&str]) -> std::result::Result<Url, String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| format!("invalid registry URL '{}': {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("registry URL '{}' cannot have a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn fetch(&self, segments: &[&str]) -> Fetch {
        let url = match self.endpoint_url(segments) {
            Ok(url) => url,
            Err(reason) => return Fetch::Failed(reason),
        };
        tracing::debug!(%url, "querying registry");

        match self.agent.get(url.as_str()).call() {
            Ok(response) => match response.into_string() {
                Ok(body) => Fetch::Body(body),
                Err(e) => Fetch::Failed(format!("reading response: {}", e)),
            },
            Err(ureq::Error::Status(404, _)) => Fetch::NotConfigured,
            Err(ureq::Error::Status(code, _)) => Fetch::Failed(format!("HTTP {}", code)),
            Err(other) => Fetch::Failed(other.to_string()),
        }
    }
}

impl ModeSource for HttpRegistry {
    fn resolve(&self, subject: &str) -> Result<CompatibilityMode> {
        resolve_via(subject, |segments| self.fetch(segments))
    }
}

/// Opt-in fallback: use `fallback` when the inner source is unavailable.
///
/// Only [`CompatError::RegistryUnavailable`] is replaced, and every use is
/// logged at `warn`.
#[derive(Debug, Clone)]
pub struct WithFallback<S> {
    inner: S,
    fallback: CompatibilityMode,
}

impl<S: ModeSource> WithFallback<S> {
    pub fn new(inner: S, fallback: CompatibilityMode) -> Self {
        Self { inner, fallback }
    }
}

impl<S: ModeSource> ModeSource for WithFallback<S> {
    fn resolve(&self, subject: &str) -> Result<CompatibilityMode> {
        match self.inner.resolve(subject) {
            Err(CompatError::RegistryUnavailable { reason, .. }) => {
                tracing::warn!(
                    subject,
                    %reason,
                    fallback = %self.fallback,
                    "registry unavailable, using configured fallback mode"
                );
                Ok(self.fallback)
            }
            other => other,
        }
    }
}

/// Build the mode source described by the registry configuration
pub fn from_config(config: &RegistryConfig) -> Box<dyn ModeSource> {
    let http = HttpRegistry::from_config(config);
    match config.fallback_mode {
        Some(fallback) => Box::new(WithFallback::new(http, fallback)),
        None => Box::new(http),
    }
}
