//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::proxy::ProxyPoolProvider;
use crate::search::Aggregator;
use crate::sources::SourceRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search aggregator
    pub aggregator: Arc<Aggregator>,
    /// Per-source metrics
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: Settings,
        registry: SourceRegistry,
        proxies: Arc<dyn ProxyPoolProvider>,
    ) -> Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let aggregator = Aggregator::from_settings(&settings, Arc::new(registry), proxies)?
            .with_metrics(metrics.clone());

        Ok(Self {
            settings: Arc::new(settings),
            aggregator: Arc::new(aggregator),
            metrics,
        })
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
