//! End-to-end behavior of the aggregator against fake job sources.

use async_trait::async_trait;
use jobscout::config::{Settings, SourceConfig};
use jobscout::proxy::StaticProxies;
use jobscout::sources::{ProxyPolicy, SourceParams, SourceRegistry};
use jobscout::{
    Aggregator, ConfigurationError, ExecutionMode, JobRecord, ProviderError, SearchRequest,
    SourceId, SourceProvider,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fake source that records every call it receives
struct FakeSource {
    name: &'static str,
    answer: Result<usize, ProviderError>,
    delay: Duration,
    calls: Mutex<Vec<SourceParams>>,
}

impl FakeSource {
    fn rows(name: &'static str, n: usize) -> Arc<Self> {
        Self::build(name, Ok(n), Duration::ZERO)
    }

    fn failing(name: &'static str, err: ProviderError) -> Arc<Self> {
        Self::build(name, Err(err), Duration::ZERO)
    }

    fn slow(name: &'static str, n: usize, delay: Duration) -> Arc<Self> {
        Self::build(name, Ok(n), delay)
    }

    fn build(name: &'static str, answer: Result<usize, ProviderError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            answer,
            delay,
            calls: Mutex::new(vec![]),
        })
    }

    fn calls(&self) -> Vec<SourceParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceProvider for FakeSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn query(&self, params: &SourceParams) -> Result<Vec<JobRecord>, ProviderError> {
        self.calls.lock().unwrap().push(params.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let n = self.answer.clone()?;
        Ok((0..n)
            .map(|i| {
                JobRecord::new(SourceId::new(self.name))
                    .with_title(format!("{} #{}", self.name, i))
                    .with_company("Acme")
            })
            .collect())
    }
}

fn pool() -> Vec<String> {
    vec!["10.0.0.1:3128".to_string(), "10.0.0.2:3128".to_string()]
}

/// Registry with google configured the way the defaults configure it
fn registry(sources: &[Arc<FakeSource>]) -> Arc<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    for source in sources {
        let config = if source.name == "google" {
            SourceConfig {
                name: "google".to_string(),
                proxy_policy: ProxyPolicy::Never,
                auxiliary_query: true,
                ..Default::default()
            }
        } else {
            SourceConfig {
                name: source.name.to_string(),
                ..Default::default()
            }
        };
        registry.register(source.clone(), config);
    }
    Arc::new(registry)
}

fn aggregator(sources: &[Arc<FakeSource>], mode: ExecutionMode) -> Aggregator {
    Aggregator::new(registry(sources), Arc::new(StaticProxies(pool()))).with_mode(mode)
}

fn titles(rows: &[JobRecord]) -> Vec<String> {
    rows.iter().map(|r| r.title.clone().unwrap_or_default()).collect()
}

const MODES: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Concurrent];

#[tokio::test]
async fn data_analyst_in_pune_merges_indeed_and_google() {
    let indeed = FakeSource::rows("indeed", 5);
    let google = FakeSource::rows("google", 3);
    let aggregator = aggregator(&[indeed.clone(), google.clone()], ExecutionMode::Sequential);

    let request = SearchRequest::new("Data Analyst", "Pune, India")
        .with_sources(["indeed", "google"])
        .with_proxies(true);
    let result = aggregator.aggregate(&request).await.unwrap();

    assert_eq!(result.rows.len(), 8);
    assert_eq!(result.count(&SourceId::new("indeed")), Some(5));
    assert_eq!(result.count(&SourceId::new("google")), Some(3));
    assert!(result.per_source_errors.is_empty());

    assert_eq!(google.calls()[0].proxies, None);
    assert_eq!(indeed.calls()[0].proxies, Some(pool()));
}

#[tokio::test]
async fn indeed_timeout_leaves_google_rows() {
    let indeed = FakeSource::failing("indeed", ProviderError::Timeout);
    let google = FakeSource::rows("google", 3);
    let aggregator = aggregator(&[indeed, google], ExecutionMode::Sequential);

    let request = SearchRequest::new("Data Analyst", "Pune, India")
        .with_sources(["indeed", "google"])
        .with_proxies(true);
    let result = aggregator.aggregate(&request).await.unwrap();

    assert_eq!(result.rows.len(), 3);
    assert!(result.rows.iter().all(|r| r.source_id == SourceId::new("google")));
    assert_eq!(result.per_source_errors.len(), 1);
    assert_eq!(
        result.error(&SourceId::new("indeed")).map(ToString::to_string),
        Some("timeout".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn row_count_and_order_do_not_depend_on_execution_mode() {
    for mode in MODES {
        let sources = [
            FakeSource::slow("indeed", 2, Duration::from_millis(300)),
            FakeSource::slow("linkedin", 3, Duration::from_millis(100)),
            FakeSource::rows("glassdoor", 1),
        ];
        let request = SearchRequest::new("Rust Developer", "Remote")
            .with_sources(["indeed", "linkedin", "glassdoor"]);

        let result = aggregator(&sources, mode).aggregate(&request).await.unwrap();

        assert_eq!(result.rows.len(), 2 + 3 + 1, "{mode:?}");
        assert_eq!(
            titles(&result.rows),
            vec![
                "indeed #0",
                "indeed #1",
                "linkedin #0",
                "linkedin #1",
                "linkedin #2",
                "glassdoor #0"
            ],
            "{mode:?}"
        );
    }
}

#[tokio::test]
async fn identical_requests_give_identical_rows() {
    let sources = [
        FakeSource::rows("naukri", 2),
        FakeSource::rows("google", 2),
        FakeSource::rows("indeed", 2),
    ];
    let aggregator = aggregator(&sources, ExecutionMode::Concurrent);
    let request =
        SearchRequest::new("QA Engineer", "Chennai").with_sources(["naukri", "google", "indeed"]);

    let first = aggregator.aggregate(&request).await.unwrap();
    let second = aggregator.aggregate(&request).await.unwrap();
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.source_order, second.source_order);
}

#[tokio::test]
async fn one_failing_source_is_isolated() {
    for mode in MODES {
        let sources = [
            FakeSource::rows("indeed", 2),
            FakeSource::failing("linkedin", ProviderError::RateLimited),
            FakeSource::rows("glassdoor", 4),
        ];
        let request = SearchRequest::new("Designer", "Mumbai")
            .with_sources(["indeed", "linkedin", "glassdoor"]);

        let result = aggregator(&sources, mode).aggregate(&request).await.unwrap();

        assert_eq!(result.rows.len(), 6);
        assert_eq!(
            result.per_source_errors.keys().collect::<Vec<_>>(),
            vec![&SourceId::new("linkedin")]
        );
        assert_eq!(result.count(&SourceId::new("linkedin")), None);
    }
}

#[tokio::test]
async fn empty_source_list_is_rejected_without_calls() {
    let indeed = FakeSource::rows("indeed", 5);
    let aggregator = aggregator(&[indeed.clone()], ExecutionMode::Sequential);

    let none: [&str; 0] = [];
    let request = SearchRequest::new("Data Analyst", "Pune").with_sources(none);
    let err = aggregator.aggregate(&request).await.unwrap_err();

    assert_eq!(err, ConfigurationError::NoSources);
    assert!(indeed.calls().is_empty());
}

#[tokio::test]
async fn all_sources_failing_is_an_empty_success() {
    let sources = [
        FakeSource::failing("indeed", ProviderError::Network("connection reset".into())),
        FakeSource::failing("google", ProviderError::Parse("unexpected token".into())),
    ];
    let request = SearchRequest::new("Dev", "Pune").with_sources(["indeed", "google"]);

    let result = aggregator(&sources, ExecutionMode::Sequential)
        .aggregate(&request)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert!(result.all_failed());
    assert_eq!(result.per_source_errors.len(), 2);
}

#[tokio::test]
async fn sources_with_no_rows_are_an_empty_success() {
    let sources = [FakeSource::rows("indeed", 0), FakeSource::rows("google", 0)];
    let request = SearchRequest::new("Dev", "Pune").with_sources(["indeed", "google"]);

    let result = aggregator(&sources, ExecutionMode::Concurrent)
        .aggregate(&request)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert!(!result.all_failed());
    assert_eq!(result.count(&SourceId::new("google")), Some(0));
}

#[tokio::test]
async fn google_never_gets_proxies() {
    for use_proxies in [true, false] {
        for mode in MODES {
            let google = FakeSource::rows("google", 1);
            let indeed = FakeSource::rows("indeed", 1);
            let request = SearchRequest::new("Dev", "Pune")
                .with_sources(["google", "indeed"])
                .with_proxies(use_proxies);

            aggregator(&[google.clone(), indeed.clone()], mode)
                .aggregate(&request)
                .await
                .unwrap();

            assert_eq!(google.calls()[0].proxies, None);
            let expected = use_proxies.then(pool);
            assert_eq!(indeed.calls()[0].proxies, expected);
        }
    }
}

#[test]
fn negative_source_timeout_is_rejected_at_load() {
    let yaml = "sources:\n  - name: indeed\n    timeout: -1\n";
    let err = Settings::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("sources.indeed.timeout"));
}

#[tokio::test]
async fn unusable_source_timeout_does_not_abort_the_search() {
    let indeed = FakeSource::rows("indeed", 2);
    let mut registry = SourceRegistry::new();
    registry.register(
        indeed.clone(),
        SourceConfig {
            name: "indeed".to_string(),
            timeout: Some(-1.0),
            ..Default::default()
        },
    );
    let registry = Arc::new(registry);

    for mode in MODES {
        let aggregator =
            Aggregator::new(registry.clone(), Arc::new(StaticProxies(pool()))).with_mode(mode);
        let request = SearchRequest::new("Data Analyst", "Pune").with_sources(["indeed"]);
        let result = aggregator.aggregate(&request).await.unwrap();
        assert_eq!(result.total(), 2);
    }
    assert_eq!(indeed.calls().len(), 2);
}
