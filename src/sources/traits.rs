//! Source provider traits and types

use crate::results::JobRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a job source, e.g. `indeed` or `google`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a normalized (trimmed, lowercase) source id
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name with the first letter uppercased, for summaries
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SourceId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for SourceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

/// Per-source override of the request-level proxy flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyPolicy {
    /// Follow the request's `use_proxies` flag
    #[default]
    Inherit,
    /// Never send proxies, whatever the request says
    Never,
    /// Always send proxies, whatever the request says
    Always,
}

impl ProxyPolicy {
    /// Whether a query under this policy should carry the proxy pool
    pub fn resolve(self, use_proxies: bool) -> bool {
        match self {
            Self::Inherit => use_proxies,
            Self::Never => false,
            Self::Always => true,
        }
    }
}

/// Parameters handed to a source provider for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceParams {
    /// Role or job title searched for
    pub role: String,
    /// Location to search in
    pub location: String,
    /// Enriched free-text query, for providers that support one
    pub auxiliary_query: Option<String>,
    /// Number of rows wanted from this source
    pub results_wanted: u32,
    /// Only postings newer than this many hours
    pub max_age_hours: u32,
    /// Country code/name used by some boards
    pub country: String,
    /// Proxy endpoints to route through, if any
    pub proxies: Option<Vec<String>>,
}

impl SourceParams {
    pub fn new(role: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            location: location.into(),
            auxiliary_query: None,
            results_wanted: 10,
            max_age_hours: 72,
            country: "India".to_string(),
            proxies: None,
        }
    }
}

/// Failure of a single source query
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited")]
    RateLimited,
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("unsupported parameter: {0}")]
    Unsupported(String),
    #[error("timeout")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.status().map(|s| s.as_u16()) == Some(429) {
            Self::RateLimited
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A job board that can be searched
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Source name
    fn name(&self) -> &str;

    /// Whether this source makes use of the enriched free-text query
    fn supports_auxiliary_query(&self) -> bool {
        false
    }

    /// Default timeout in seconds
    fn timeout(&self) -> f64 {
        60.0
    }

    /// Run one search against the source
    async fn query(&self, params: &SourceParams) -> Result<Vec<JobRecord>, ProviderError>;
}
