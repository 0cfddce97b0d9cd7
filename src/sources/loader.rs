//! Source loader for building the registry from configuration

use super::registry::SourceRegistry;
use super::remote::RemoteSource;
use super::traits::SourceProvider;
use crate::config::{parse_timeout, Settings, SourceConfig};
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing sources from configuration
pub struct SourceLoader;

impl SourceLoader {
    /// Load all enabled sources from settings
    pub fn load(settings: &Settings, client: &HttpClient) -> Result<SourceRegistry> {
        let mut registry = SourceRegistry::new();

        for config in &settings.sources {
            if config.disabled {
                info!("Skipping disabled source: {}", config.name);
                continue;
            }

            match Self::create_source(config, settings, client) {
                Ok(source) => {
                    info!("Loaded source: {} ({})", config.name, config.kind);
                    registry.register(source, config.clone());
                }
                Err(e) => {
                    warn!("Failed to load source {}: {}", config.name, e);
                }
            }
        }

        info!("Loaded {} sources", registry.len());
        Ok(registry)
    }

    fn create_source(
        config: &SourceConfig,
        settings: &Settings,
        client: &HttpClient,
    ) -> Result<Arc<dyn SourceProvider>> {
        if config.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Source name must not be empty"));
        }

        match config.kind.as_str() {
            "remote" => {
                let endpoint = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| settings.outgoing.scraper_url.clone());
                url::Url::parse(&endpoint)?;

                let mut source = RemoteSource::new(config.name.trim(), endpoint, client.clone())
                    .with_auxiliary_query(config.auxiliary_query);
                if let Some(secs) = config.timeout {
                    source = source.with_timeout(parse_timeout("timeout", secs)?);
                }
                Ok(Arc::new(source))
            }
            other => Err(anyhow::anyhow!("Unknown source kind: {}", other)),
        }
    }
}
