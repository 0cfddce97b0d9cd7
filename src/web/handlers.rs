//! HTTP request handlers

use super::state::AppState;
use crate::results::{to_csv_string, AggregateResult, JobRecord, SearchSummary};
use crate::search::SearchRequest;
use crate::sources::{ProxyPolicy, SourceId};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub role: Option<String>,
    pub location: Option<String>,
    /// Sources (comma-separated)
    pub sources: Option<String>,
    pub results: Option<u32>,
    pub hours: Option<u32>,
    pub country: Option<String>,
    pub proxies: Option<bool>,
    pub auxiliary: Option<bool>,
    /// Output format: json (default) or csv
    pub format: Option<String>,
}

/// Body of `POST /search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    pub role: Option<String>,
    pub location: Option<String>,
    pub sources: Option<Vec<String>>,
    pub results: Option<u32>,
    pub hours: Option<u32>,
    pub country: Option<String>,
    pub proxies: Option<bool>,
    pub auxiliary: Option<bool>,
    pub format: Option<String>,
}

impl From<SearchParams> for SearchBody {
    fn from(params: SearchParams) -> Self {
        Self {
            role: params.role,
            location: params.location,
            sources: params.sources.map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            results: params.results,
            hours: params.hours,
            country: params.country,
            proxies: params.proxies,
            auxiliary: params.auxiliary,
            format: params.format,
        }
    }
}

impl SearchBody {
    /// Fill in missing fields from the configured defaults
    fn into_request(self, state: &AppState) -> (SearchRequest, Option<String>) {
        let mut request = SearchRequest::from_settings(&state.settings.search);

        if let Some(role) = self.role {
            request = request.with_role(role);
        }
        if let Some(location) = self.location {
            request = request.with_location(location);
        }
        if let Some(sources) = self.sources {
            request = request.with_sources(sources);
        }
        if let Some(n) = self.results {
            request = request.with_results_per_source(n);
        }
        if let Some(hours) = self.hours {
            request = request.with_max_age_hours(hours);
        }
        if let Some(country) = self.country {
            request = request.with_country(country);
        }
        if let Some(proxies) = self.proxies {
            request = request.with_proxies(proxies);
        }
        if let Some(auxiliary) = self.auxiliary {
            request = request.with_auxiliary_query(auxiliary);
        }

        (request, self.format)
    }
}

#[derive(Debug, Serialize)]
pub struct SourceCount {
    pub source: SourceId,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SourceFailure {
    pub source: SourceId,
    pub error: String,
}

/// JSON response of a search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub summary: String,
    pub total: usize,
    pub elapsed_ms: u64,
    pub counts: Vec<SourceCount>,
    pub errors: Vec<SourceFailure>,
    pub rows: Vec<JobRecord>,
}

impl From<AggregateResult> for SearchResponse {
    fn from(result: AggregateResult) -> Self {
        let summary = SearchSummary::from_result(&result).to_string();
        let counts = result
            .ordered_counts()
            .into_iter()
            .map(|(source, count)| SourceCount {
                source: source.clone(),
                count,
            })
            .collect();
        let errors = result
            .ordered_errors()
            .into_iter()
            .map(|(source, err)| SourceFailure {
                source: source.clone(),
                error: err.to_string(),
            })
            .collect();

        Self {
            summary,
            total: result.total(),
            elapsed_ms: result.elapsed.as_millis() as u64,
            counts,
            errors,
            rows: result.rows,
        }
    }
}

/// Search handler (query string)
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    run_search(state, params.into()).await
}

/// Search handler (JSON body)
pub async fn search_json(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Response {
    run_search(state, body).await
}

async fn run_search(state: AppState, body: SearchBody) -> Response {
    let (request, format) = body.into_request(&state);

    let result = match state.aggregator.aggregate(&request).await {
        Ok(result) => result,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    match format.as_deref() {
        Some("csv") => match to_csv_string(&result.rows) {
            Ok(csv) => (
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"jobs.csv\""),
                ],
                csv,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("CSV export failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed").into_response()
            }
        },
        _ => Json(SearchResponse::from(result)).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct SourceInfo {
    pub id: SourceId,
    pub proxy_policy: ProxyPolicy,
    pub auxiliary_query: bool,
    pub timeout: f64,
}

/// Registered sources with their policies
pub async fn sources(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.aggregator.registry();
    let default_timeout = state.settings.outgoing.request_timeout;

    let list: Vec<SourceInfo> = registry
        .ids()
        .iter()
        .map(|id| SourceInfo {
            id: id.clone(),
            proxy_policy: registry.proxy_policy(id),
            auxiliary_query: registry.supports_auxiliary_query(id),
            timeout: registry.get_timeout(id, default_timeout),
        })
        .collect();

    Json(list)
}

/// Search and per-source statistics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "instance_name": state.instance_name(),
        "total_searches": state.metrics.get_total_searches(),
        "rejected_searches": state.metrics.get_rejected_searches(),
        "sources": state.metrics.get_all_stats(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
