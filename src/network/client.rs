//! HTTP client for talking to the scraping service and the proxy list

use crate::config::{parse_timeout, OutgoingSettings};
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;

/// Raw response from an outgoing request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl HttpResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// HTTP client wrapper with jobscout-specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = parse_timeout("outgoing.request_timeout", settings.request_timeout)?;

        let mut headers = HeaderMap::new();
        for (key, value) in &settings.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(concat!("jobscout/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            default_timeout: timeout,
        })
    }

    /// Simple GET request
    pub async fn get(&self, url: &str) -> reqwest::Result<HttpResponse> {
        self.get_with_params(url, &[], self.default_timeout).await
    }

    /// GET request with query parameters and a custom timeout
    pub async fn get_with_params(
        &self,
        url: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> reqwest::Result<HttpResponse> {
        let mut req_builder = self
            .client
            .get(url)
            .timeout(timeout)
            .header("Accept", "application/json,text/plain;q=0.9,*/*;q=0.8");

        if !params.is_empty() {
            req_builder = req_builder.query(params);
        }

        let response = req_builder.send().await?;
        Self::parse_response(response).await
    }

    /// Default timeout applied to requests
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn parse_response(response: Response) -> reqwest::Result<HttpResponse> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(HttpResponse { status, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_extra_header_is_rejected() {
        let settings = OutgoingSettings {
            extra_headers: HashMap::from([("bad header".to_string(), "x".to_string())]),
            ..Default::default()
        };
        assert!(HttpClient::with_settings(&settings).is_err());
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let settings = OutgoingSettings {
            request_timeout: -1.0,
            ..Default::default()
        };
        assert!(HttpClient::with_settings(&settings).is_err());
    }

    #[test]
    fn test_response_helpers() {
        let response = HttpResponse {
            status: 429,
            text: "[]".to_string(),
        };
        assert!(!response.is_success());
        assert!(response.is_rate_limited());
    }
}
