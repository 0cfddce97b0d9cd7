//! Fan-out/fan-in over job sources

use super::models::{ConfigurationError, SearchRequest};
use crate::config::{parse_timeout, Settings};
use crate::metrics::Metrics;
use crate::proxy::ProxyPoolProvider;
use crate::results::{AggregateResult, SourceOutcome};
use crate::sources::{ProviderError, SourceId, SourceParams, SourceProvider, SourceRegistry};
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// How the selected sources are queried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One source after another
    #[default]
    Sequential,
    /// All sources at once; results still folded in plan order
    Concurrent,
}

/// One planned source query
struct PlannedQuery {
    source: SourceId,
    provider: Arc<dyn SourceProvider>,
    params: SourceParams,
    timeout: Duration,
}

/// Queries every selected source and merges what comes back
pub struct Aggregator {
    registry: Arc<SourceRegistry>,
    proxies: Arc<dyn ProxyPoolProvider>,
    metrics: Option<Arc<Metrics>>,
    mode: ExecutionMode,
    /// Used for sources with no timeout of their own
    default_timeout: Duration,
    /// Deadline for a whole search
    overall_timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(registry: Arc<SourceRegistry>, proxies: Arc<dyn ProxyPoolProvider>) -> Self {
        Self {
            registry,
            proxies,
            metrics: None,
            mode: ExecutionMode::Sequential,
            default_timeout: Duration::from_secs(60),
            overall_timeout: None,
        }
    }

    /// Build an aggregator configured by the search and outgoing settings
    pub fn from_settings(
        settings: &Settings,
        registry: Arc<SourceRegistry>,
        proxies: Arc<dyn ProxyPoolProvider>,
    ) -> anyhow::Result<Self> {
        let mode = if settings.search.concurrent {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Sequential
        };

        let overall_timeout = settings
            .search
            .overall_timeout
            .map(|secs| parse_timeout("search.overall_timeout", secs))
            .transpose()?;

        Ok(Self::new(registry, proxies)
            .with_mode(mode)
            .with_timeout(parse_timeout(
                "outgoing.request_timeout",
                settings.outgoing.request_timeout,
            )?)
            .with_overall_timeout(overall_timeout))
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_overall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.overall_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Run a search. Only an invalid request is an error; failing sources are
    /// recorded in the result.
    pub async fn aggregate(
        &self,
        request: &SearchRequest,
    ) -> Result<AggregateResult, ConfigurationError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("aggregate", %request_id, role = %request.role);

        async move {
            let plan = match self.plan(request).await {
                Ok(plan) => plan,
                Err(e) => {
                    warn!("Rejected search: {}", e);
                    if let Some(ref metrics) = self.metrics {
                        metrics.inc_rejected();
                    }
                    return Err(e);
                }
            };

            if let Some(ref metrics) = self.metrics {
                metrics.inc_search();
            }

            info!(
                "Searching {} sources for '{}' in '{}' ({:?})",
                plan.len(),
                request.role,
                request.location,
                self.mode
            );

            let start = Instant::now();
            let deadline = self.overall_timeout.map(|t| start + t);

            let outcomes = match self.mode {
                ExecutionMode::Sequential => {
                    let mut outcomes = Vec::with_capacity(plan.len());
                    for query in plan {
                        outcomes.push(self.run_query(query, deadline).await);
                    }
                    outcomes
                }
                // join_all yields in input order, not completion order.
                ExecutionMode::Concurrent => {
                    join_all(plan.into_iter().map(|q| self.run_query(q, deadline))).await
                }
            };

            let result = AggregateResult::fold(outcomes, start.elapsed());
            info!(
                "Found {} jobs from {} sources in {:.2}s ({} failed)",
                result.total(),
                result.per_source_counts.len(),
                result.elapsed.as_secs_f64(),
                result.per_source_errors.len()
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Validate the request and work out what each source gets
    async fn plan(&self, request: &SearchRequest) -> Result<Vec<PlannedQuery>, ConfigurationError> {
        request.validate()?;

        let mut auxiliary = Vec::new();
        let mut standard = Vec::new();
        for source in request.unique_sources() {
            let provider = self
                .registry
                .get(source)
                .ok_or_else(|| ConfigurationError::UnknownSource(source.clone()))?;

            if self.registry.supports_auxiliary_query(source) {
                auxiliary.push((source.clone(), provider.clone()));
            } else {
                standard.push((source.clone(), provider.clone()));
            }
        }

        // Auxiliary-query sources go first, the rest keep request order.
        let ordered: Vec<_> = auxiliary.into_iter().chain(standard).collect();

        let wants_proxies = |source: &SourceId| {
            self.registry
                .proxy_policy(source)
                .resolve(request.use_proxies)
        };

        let pool = if ordered.iter().any(|(source, _)| wants_proxies(source)) {
            Some(self.proxies.proxies().await)
        } else {
            None
        };

        let auxiliary_query = request.auxiliary_query();

        Ok(ordered
            .into_iter()
            .map(|(source, provider)| {
                let params = SourceParams {
                    role: request.role.clone(),
                    location: request.location.clone(),
                    auxiliary_query: if self.registry.supports_auxiliary_query(&source) {
                        auxiliary_query.clone()
                    } else {
                        None
                    },
                    results_wanted: request.results_per_source,
                    max_age_hours: request.max_age_hours,
                    country: request.country.clone(),
                    proxies: if wants_proxies(&source) {
                        pool.clone()
                    } else {
                        None
                    },
                };

                let secs = self
                    .registry
                    .get_timeout(&source, self.default_timeout.as_secs_f64());
                let timeout = Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
                    warn!("Ignoring invalid timeout {} for {}", secs, source);
                    self.default_timeout
                });

                PlannedQuery {
                    source,
                    provider,
                    params,
                    timeout,
                }
            })
            .collect())
    }

    /// Query one source; nothing it does escapes as anything but a `ProviderError`
    async fn run_query(&self, query: PlannedQuery, deadline: Option<Instant>) -> SourceOutcome {
        let PlannedQuery {
            source,
            provider,
            params,
            timeout,
        } = query;

        let start = Instant::now();
        let mut limit = start + timeout;
        if let Some(deadline) = deadline {
            limit = limit.min(deadline);
        }

        let result = if start >= limit {
            debug!("Deadline passed before querying {}", source);
            Err(ProviderError::Timeout)
        } else {
            info!(
                "Scraping {} for {} jobs in {}...",
                source.display_name(),
                params.role,
                params.location
            );
            let call = AssertUnwindSafe(provider.query(&params)).catch_unwind();
            match timeout_at(limit, call).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(ProviderError::Other("provider panicked".to_string())),
                Err(_) => Err(ProviderError::Timeout),
            }
        };

        let elapsed = start.elapsed();
        match &result {
            Ok(rows) => debug!(
                "Source {} returned {} rows in {:?}",
                source,
                rows.len(),
                elapsed
            ),
            Err(e) => warn!("Error scraping {}: {}", source, e),
        }

        if let Some(ref metrics) = self.metrics {
            metrics.record_source(
                source.as_str(),
                elapsed.as_millis() as u64,
                result.as_ref().ok().map(Vec::len),
            );
        }

        SourceOutcome {
            source,
            result,
            elapsed,
        }
    }
}
