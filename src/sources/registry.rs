//! Source registry for managing available job sources

use super::traits::{ProxyPolicy, SourceId, SourceProvider};
use crate::config::SourceConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all available job sources
#[derive(Clone)]
pub struct SourceRegistry {
    /// Providers by id
    sources: HashMap<SourceId, Arc<dyn SourceProvider>>,
    /// Proxy overrides by id
    proxy_policies: HashMap<SourceId, ProxyPolicy>,
    /// Source configurations
    configs: HashMap<SourceId, SourceConfig>,
    /// Registration order
    order: Vec<SourceId>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            proxy_policies: HashMap::new(),
            configs: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a source with its configuration
    pub fn register(&mut self, source: Arc<dyn SourceProvider>, config: SourceConfig) {
        let id = SourceId::new(source.name());

        self.set_proxy_policy(&id, config.proxy_policy);

        if !self.sources.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.sources.insert(id.clone(), source);
        self.configs.insert(id, config);
    }

    /// Register a source with default configuration
    pub fn register_default(&mut self, source: Arc<dyn SourceProvider>) {
        let config = SourceConfig {
            name: source.name().to_string(),
            ..Default::default()
        };
        self.register(source, config);
    }

    /// Override the proxy policy of a registered source
    pub fn set_proxy_policy(&mut self, id: &SourceId, policy: ProxyPolicy) {
        match policy {
            ProxyPolicy::Inherit => {
                self.proxy_policies.remove(id);
            }
            _ => {
                self.proxy_policies.insert(id.clone(), policy);
            }
        }
    }

    /// Get a source by id
    pub fn get(&self, id: &SourceId) -> Option<&Arc<dyn SourceProvider>> {
        self.sources.get(id)
    }

    /// Proxy policy for a source, `Inherit` when none was set
    pub fn proxy_policy(&self, id: &SourceId) -> ProxyPolicy {
        self.proxy_policies.get(id).copied().unwrap_or_default()
    }

    /// Whether the source accepts the enriched free-text query
    pub fn supports_auxiliary_query(&self, id: &SourceId) -> bool {
        self.configs
            .get(id)
            .map(|c| c.auxiliary_query)
            .unwrap_or(false)
            || self
                .sources
                .get(id)
                .map(|s| s.supports_auxiliary_query())
                .unwrap_or(false)
    }

    /// Effective timeout for a source in seconds
    pub fn get_timeout(&self, id: &SourceId, default: f64) -> f64 {
        self.configs
            .get(id)
            .and_then(|c| c.timeout)
            .or_else(|| self.sources.get(id).map(|s| s.timeout()))
            .unwrap_or(default)
    }

    /// All source ids in registration order
    pub fn ids(&self) -> &[SourceId] {
        &self.order
    }

    /// Get number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
