//! HTTP-level tests for the router, exercised via tower::ServiceExt::oneshot.

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use jobscout::config::{Settings, SourceConfig};
use jobscout::proxy::StaticProxies;
use jobscout::sources::{ProxyPolicy, SourceParams, SourceRegistry};
use jobscout::web::{create_router, AppState};
use jobscout::{JobRecord, ProviderError, SourceId, SourceProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt as _;

const BODY_LIMIT: usize = 1024 * 1024;

struct Board {
    name: &'static str,
    rows: usize,
    fail: bool,
}

#[async_trait]
impl SourceProvider for Board {
    fn name(&self) -> &str {
        self.name
    }

    async fn query(&self, params: &SourceParams) -> Result<Vec<JobRecord>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Timeout);
        }
        Ok((0..self.rows)
            .map(|i| {
                JobRecord::new(SourceId::new(self.name))
                    .with_title(format!("{} {}", params.role, i))
                    .with_location(params.location.clone())
            })
            .collect())
    }
}

fn test_router() -> Router {
    let mut registry = SourceRegistry::new();
    registry.register_default(Arc::new(Board {
        name: "indeed",
        rows: 2,
        fail: false,
    }));
    registry.register(
        Arc::new(Board {
            name: "google",
            rows: 1,
            fail: false,
        }),
        SourceConfig {
            name: "google".to_string(),
            proxy_policy: ProxyPolicy::Never,
            auxiliary_query: true,
            ..Default::default()
        },
    );
    registry.register_default(Arc::new(Board {
        name: "linkedin",
        rows: 0,
        fail: true,
    }));

    let state = AppState::new(
        Settings::default(),
        registry,
        Arc::new(StaticProxies::default()),
    )
    .expect("state");
    create_router(state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = send(test_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], jobscout::VERSION);
}

#[tokio::test]
async fn sources_lists_policies_in_registration_order() {
    let (status, body) = send(test_router(), get("/sources")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    let ids: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["indeed", "google", "linkedin"]);
    assert_eq!(json[1]["proxy_policy"], "never");
    assert_eq!(json[1]["auxiliary_query"], true);
    assert_eq!(json[0]["proxy_policy"], "inherit");
}

#[tokio::test]
async fn search_returns_rows_counts_and_errors() {
    let uri = "/search?role=Data%20Analyst&location=Pune&sources=indeed,google,linkedin";
    let (status, body) = send(test_router(), get(uri)).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(
        json["counts"],
        json!([{"source": "google", "count": 1}, {"source": "indeed", "count": 2}])
    );
    assert_eq!(json["errors"], json!([{"source": "linkedin", "error": "timeout"}]));
    assert_eq!(json["rows"][0]["site"], "google");
    assert_eq!(json["rows"][1]["title"], "Data Analyst 0");
    assert!(json["summary"]
        .as_str()
        .unwrap()
        .starts_with("Found 3 jobs in"));
}

#[tokio::test]
async fn search_without_sources_is_a_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .body(Body::from(json!({"role": "Dev", "sources": []}).to_string()))
        .unwrap();

    let (status, body) = send(test_router(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Please select at least one job site.");
}

#[tokio::test]
async fn search_with_only_failing_sources_reports_no_jobs() {
    let req = Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .body(Body::from(json!({"role": "Dev", "sources": ["linkedin"]}).to_string()))
        .unwrap();

    let (status, body) = send(test_router(), req).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total"], 0);
    assert!(json["summary"]
        .as_str()
        .unwrap()
        .starts_with("No jobs found matching your criteria."));
}

#[tokio::test]
async fn search_as_csv() {
    let uri = "/search?role=Dev&location=Pune&sources=indeed&format=csv";
    let (status, body) = send(test_router(), get(uri)).await;
    assert_eq!(status, StatusCode::OK);

    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("title,company,location,date_posted,site,job_url")
    );
    assert_eq!(lines.next(), Some("Dev 0,,Pune,,indeed,"));
    assert_eq!(lines.count(), 1);
}

#[tokio::test]
async fn stats_count_searches() {
    let app = test_router();
    send(app.clone(), get("/search?role=Dev&sources=indeed")).await;
    send(app.clone(), get("/search?role=Dev&sources=monster")).await;

    let (status, body) = send(app, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total_searches"], 1);
    assert_eq!(json["rejected_searches"], 1);
    assert_eq!(json["sources"]["indeed"]["rows"], 2);
}
