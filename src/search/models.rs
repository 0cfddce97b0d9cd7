//! Search request and related data models

use crate::config::SearchSettings;
use crate::sources::SourceId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a request was rejected before any source was queried
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Please select at least one job site.")]
    NoSources,
    #[error("Job role must not be empty.")]
    EmptyRole,
    #[error("Unknown job site: {0}")]
    UnknownSource(SourceId),
    #[error("{0} must be a positive number.")]
    InvalidLimit(&'static str),
}

/// One job search, built once per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Role or job title
    pub role: String,
    /// Location to search in
    pub location: String,
    /// Sources to query; duplicates are ignored
    pub sources: Vec<SourceId>,
    /// Rows wanted from each source
    pub results_per_source: u32,
    /// Only postings newer than this many hours
    pub max_age_hours: u32,
    /// Country code/name handed to sources
    pub country: String,
    /// Route sources whose policy allows it through the proxy pool
    pub use_proxies: bool,
    /// Send the enriched free-text query to sources that support it
    pub use_auxiliary_query: bool,
}

impl SearchRequest {
    /// Create a request with the built-in defaults
    pub fn new(role: impl Into<String>, location: impl Into<String>) -> Self {
        Self::from_settings(&SearchSettings::default())
            .with_role(role)
            .with_location(location)
    }

    /// Create a request from configured defaults
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            role: settings.default_role.clone(),
            location: settings.default_location.clone(),
            sources: vec![],
            results_per_source: settings.results_per_source,
            max_age_hours: settings.max_age_hours,
            country: settings.country.clone(),
            use_proxies: settings.use_proxies,
            use_auxiliary_query: settings.use_auxiliary_query,
        }
        .with_sources(settings.default_sources.iter().map(String::as_str))
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Replace the source list, collapsing duplicates
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        self.sources.clear();
        for source in sources {
            self.add_source(source);
        }
        self
    }

    /// Add a source unless it is already selected
    pub fn add_source(&mut self, source: impl Into<SourceId>) {
        let source = source.into();
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn with_results_per_source(mut self, n: u32) -> Self {
        self.results_per_source = n;
        self
    }

    pub fn with_max_age_hours(mut self, hours: u32) -> Self {
        self.max_age_hours = hours;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_proxies(mut self, use_proxies: bool) -> Self {
        self.use_proxies = use_proxies;
        self
    }

    pub fn with_auxiliary_query(mut self, use_auxiliary_query: bool) -> Self {
        self.use_auxiliary_query = use_auxiliary_query;
        self
    }

    /// Enriched free-text query, when enabled
    pub fn auxiliary_query(&self) -> Option<String> {
        self.use_auxiliary_query
            .then(|| format!("{} jobs near {} since yesterday", self.role, self.location))
    }

    /// Selected sources in order, first occurrence wins
    pub fn unique_sources(&self) -> Vec<&SourceId> {
        let mut seen = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if !seen.contains(&source) {
                seen.push(source);
            }
        }
        seen
    }

    /// Checks that do not need the registry
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.sources.is_empty() {
            return Err(ConfigurationError::NoSources);
        }
        if self.role.trim().is_empty() {
            return Err(ConfigurationError::EmptyRole);
        }
        if self.results_per_source == 0 {
            return Err(ConfigurationError::InvalidLimit("Results per site"));
        }
        if self.max_age_hours == 0 {
            return Err(ConfigurationError::InvalidLimit("Posted within (hours)"));
        }
        Ok(())
    }
}
