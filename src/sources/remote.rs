//! Source backed by an HTTP scraping service
//!
//! The service does the actual board scraping; this provider only maps
//! query parameters onto its wire format and its JSON rows onto `JobRecord`.

use super::traits::*;
use crate::network::HttpClient;
use crate::results::{parse_date, JobRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Job board reached through the scraping service
pub struct RemoteSource {
    name: String,
    endpoint: String,
    client: HttpClient,
    auxiliary_query: bool,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, client: HttpClient) -> Self {
        let timeout = client.default_timeout();
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
            auxiliary_query: false,
            timeout,
        }
    }

    /// Mark this board as accepting the enriched free-text query
    pub fn with_auxiliary_query(mut self, supported: bool) -> Self {
        self.auxiliary_query = supported;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn query_params(&self, params: &SourceParams) -> Vec<(String, String)> {
        let mut query = vec![
            ("site_name".to_string(), self.name.clone()),
            ("search_term".to_string(), params.role.clone()),
            ("location".to_string(), params.location.clone()),
            ("results_wanted".to_string(), params.results_wanted.to_string()),
            ("hours_old".to_string(), params.max_age_hours.to_string()),
            ("country_indeed".to_string(), params.country.clone()),
        ];

        if let Some(ref term) = params.auxiliary_query {
            query.push(("google_search_term".to_string(), term.clone()));
        }

        if let Some(ref proxies) = params.proxies {
            if !proxies.is_empty() {
                query.push(("proxies".to_string(), proxies.join(",")));
            }
        }

        query
    }

    fn parse_rows(&self, text: &str) -> Result<Vec<JobRecord>, ProviderError> {
        let payload: Payload =
            serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let source = SourceId::new(&self.name);
        Ok(payload
            .into_rows()
            .into_iter()
            .map(|row| row.into_record(source.clone()))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for RemoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_auxiliary_query(&self) -> bool {
        self.auxiliary_query
    }

    fn timeout(&self) -> f64 {
        self.timeout.as_secs_f64()
    }

    async fn query(&self, params: &SourceParams) -> Result<Vec<JobRecord>, ProviderError> {
        let query = self.query_params(params);
        let response = self
            .client
            .get_with_params(&self.endpoint, &query, self.timeout)
            .await?;

        if response.is_rate_limited() {
            return Err(ProviderError::RateLimited);
        }
        if !response.is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", response.status)));
        }

        let rows = self.parse_rows(&response.text)?;
        debug!("Source {} returned {} rows", self.name, rows.len());
        Ok(rows)
    }
}

/// Service response: a bare array or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Rows(Vec<RemoteJob>),
    Wrapped { jobs: Vec<RemoteJob> },
}

impl Payload {
    fn into_rows(self) -> Vec<RemoteJob> {
        match self {
            Self::Rows(rows) => rows,
            Self::Wrapped { jobs } => jobs,
        }
    }
}

/// One row as the scraping service sends it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteJob {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    date_posted: Option<serde_json::Value>,
    job_url: Option<String>,
}

impl RemoteJob {
    fn into_record(self, source: SourceId) -> JobRecord {
        let date_posted = match self.date_posted {
            Some(serde_json::Value::String(s)) => parse_date(&s),
            _ => None,
        };

        JobRecord {
            title: non_blank(self.title),
            company: non_blank(self.company),
            location: non_blank(self.location),
            date_posted,
            source_id: source,
            apply_url: non_blank(self.job_url),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
