//! Settings structures for jobscout configuration

use crate::sources::ProxyPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub proxies: ProxySettings,
    pub sources: Vec<SourceConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            search: SearchSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            proxies: ProxySettings::default(),
            sources: default_sources(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that cannot be used at runtime
    pub fn validate(&self) -> Result<()> {
        parse_timeout("outgoing.request_timeout", self.outgoing.request_timeout)?;
        if let Some(secs) = self.search.overall_timeout {
            parse_timeout("search.overall_timeout", secs)?;
        }
        for source in &self.sources {
            if let Some(secs) = source.timeout {
                parse_timeout(&format!("sources.{}.timeout", source.name), secs)?;
            }
        }
        Ok(())
    }

    /// Merge with environment variables (JOBSCOUT_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub(crate) fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("JOBSCOUT_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = lookup("JOBSCOUT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("JOBSCOUT_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("JOBSCOUT_SCRAPER_URL") {
            self.outgoing.scraper_url = val;
        }
        if let Some(val) = lookup("JOBSCOUT_PROXY_LIST_URL") {
            self.proxies.list_url = Some(val).filter(|v| !v.trim().is_empty());
        }
        if let Some(val) = lookup("JOBSCOUT_CONCURRENT") {
            self.search.concurrent = val.parse().unwrap_or(self.search.concurrent);
        }
    }

    /// Get source config by name
    pub fn get_source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// Convert a timeout given in seconds, rejecting negative and non-finite values
pub fn parse_timeout(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("{} must be a non-negative number of seconds: {}", field, e))
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the API
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "jobscout".to_string(),
        }
    }
}

/// Search defaults and aggregation behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default role when none is given
    pub default_role: String,
    /// Default location when none is given
    pub default_location: String,
    /// Sources used when a request does not name any
    pub default_sources: Vec<String>,
    /// Results requested from each source
    pub results_per_source: u32,
    /// Only keep postings newer than this many hours
    pub max_age_hours: u32,
    /// Country passed to sources that need one
    pub country: String,
    /// Route standard sources through the proxy pool
    pub use_proxies: bool,
    /// Send the enriched free-text query to sources that support it
    pub use_auxiliary_query: bool,
    /// Query sources concurrently instead of one after another
    pub concurrent: bool,
    /// Overall deadline for one search in seconds (none = unbounded)
    pub overall_timeout: Option<f64>,
    /// Where the CLI writes the CSV artifact
    pub csv_path: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_role: "Software Engineer".to_string(),
            default_location: "Bangalore, India".to_string(),
            default_sources: vec![
                "indeed".to_string(),
                "linkedin".to_string(),
                "glassdoor".to_string(),
                "google".to_string(),
            ],
            results_per_source: 10,
            max_age_hours: 72,
            country: "India".to_string(),
            use_proxies: true,
            use_auxiliary_query: true,
            concurrent: false,
            overall_timeout: None,
            csv_path: "jobs.csv".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 7860,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Base URL of the scraping service used by remote sources
    pub scraper_url: String,
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            scraper_url: "http://127.0.0.1:8000/jobs".to_string(),
            request_timeout: 60.0,
            pool_maxsize: 20,
            verify_ssl: true,
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// URL returning a newline-separated proxy list
    pub list_url: Option<String>,
    /// Proxies used when the list cannot be fetched
    pub fallback: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            list_url: None,
            fallback: vec!["154.213.204.37:3128".to_string(), "localhost".to_string()],
        }
    }
}

/// Individual source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source name (unique identifier)
    pub name: String,
    /// Provider kind to build
    pub kind: String,
    /// Whether the source is disabled
    pub disabled: bool,
    /// Custom timeout for this source in seconds
    pub timeout: Option<f64>,
    /// Proxy override consulted before the request flag
    pub proxy_policy: ProxyPolicy,
    /// Whether the source accepts the enriched free-text query
    pub auxiliary_query: bool,
    /// Endpoint override for remote sources
    pub endpoint: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: "remote".to_string(),
            disabled: false,
            timeout: None,
            proxy_policy: ProxyPolicy::Inherit,
            auxiliary_query: false,
            endpoint: None,
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    let standard = |name: &str| SourceConfig {
        name: name.to_string(),
        ..Default::default()
    };

    vec![
        standard("indeed"),
        standard("linkedin"),
        standard("glassdoor"),
        // Proxied requests to google come back 429.
        SourceConfig {
            name: "google".to_string(),
            proxy_policy: ProxyPolicy::Never,
            auxiliary_query: true,
            ..Default::default()
        },
        standard("naukri"),
    ]
}
