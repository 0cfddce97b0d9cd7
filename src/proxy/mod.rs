//! Proxy pool
//!
//! The pool is fetched at most once per process and then shared by every
//! search. It is never refreshed, so a long-running server keeps using the
//! list it saw first. Fetch problems never reach callers: they get the
//! fallback list instead.

use crate::config::ProxySettings;
use crate::network::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Supplies proxy endpoints to the aggregator
#[async_trait]
pub trait ProxyPoolProvider: Send + Sync {
    /// Current proxy list; degraded to a fallback, never an error
    async fn proxies(&self) -> Vec<String>;
}

/// Fetches a fresh proxy list from somewhere
#[async_trait]
pub trait ProxyFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>>;
}

/// Downloads a newline-separated proxy list
pub struct HttpProxyFetcher {
    client: HttpClient,
    url: String,
}

impl HttpProxyFetcher {
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ProxyFetcher for HttpProxyFetcher {
    async fn fetch(&self) -> Result<Vec<String>> {
        let response = self.client.get(&self.url).await?;
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP {}", response.status));
        }

        Ok(parse_proxy_list(&response.text))
    }
}

/// One proxy per line, surrounding whitespace and blank lines dropped
pub fn parse_proxy_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lazily loaded, process-wide proxy list
pub struct ProxyPool {
    fetcher: Option<Box<dyn ProxyFetcher>>,
    fallback: Vec<String>,
    loaded: OnceCell<Vec<String>>,
}

impl ProxyPool {
    pub fn new(fetcher: Option<Box<dyn ProxyFetcher>>, fallback: Vec<String>) -> Self {
        Self {
            fetcher,
            fallback,
            loaded: OnceCell::new(),
        }
    }

    /// Build the pool described by the settings
    pub fn from_settings(settings: &ProxySettings, client: &HttpClient) -> Self {
        let fetcher = settings.list_url.as_ref().map(|url| {
            Box::new(HttpProxyFetcher::new(client.clone(), url.clone())) as Box<dyn ProxyFetcher>
        });
        Self::new(fetcher, settings.fallback.clone())
    }

    /// Whether the list has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn load(&self) -> Vec<String> {
        let Some(ref fetcher) = self.fetcher else {
            info!("No proxy list configured, using {} fallback proxies", self.fallback.len());
            return self.fallback.clone();
        };

        match fetcher.fetch().await {
            Ok(list) if !list.is_empty() => {
                info!("Fetched {} proxies", list.len());
                list
            }
            Ok(_) => {
                warn!("Proxy list was empty, using fallback proxies");
                self.fallback.clone()
            }
            Err(e) => {
                warn!("Error fetching proxies: {}, using fallback proxies", e);
                self.fallback.clone()
            }
        }
    }
}

#[async_trait]
impl ProxyPoolProvider for ProxyPool {
    async fn proxies(&self) -> Vec<String> {
        self.loaded.get_or_init(|| self.load()).await.clone()
    }
}

/// Fixed proxy list
#[derive(Debug, Clone, Default)]
pub struct StaticProxies(pub Vec<String>);

#[async_trait]
impl ProxyPoolProvider for StaticProxies {
    async fn proxies(&self) -> Vec<String> {
        self.0.clone()
    }
}
