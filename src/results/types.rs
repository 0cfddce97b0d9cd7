//! Result type definitions

use crate::sources::{ProviderError, SourceId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date_posted: Option<NaiveDate>,
    /// Source that returned the posting
    #[serde(rename = "site")]
    pub source_id: SourceId,
    #[serde(rename = "job_url")]
    pub apply_url: Option<String>,
}

impl JobRecord {
    /// Create an empty record for a source
    pub fn new(source_id: SourceId) -> Self {
        Self {
            title: None,
            company: None,
            location: None,
            date_posted: None,
            source_id,
            apply_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date_posted(mut self, date: NaiveDate) -> Self {
        self.date_posted = Some(date);
        self
    }

    pub fn with_apply_url(mut self, url: impl Into<String>) -> Self {
        self.apply_url = Some(url.into());
        self
    }
}

/// Accepts `YYYY-MM-DD`, a full timestamp, or anything else (treated as unknown)
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_date(&s)))
}

/// Parse the date part of a `YYYY-MM-DD...` string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Outcome of querying one source
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: SourceId,
    pub result: Result<Vec<JobRecord>, ProviderError>,
    pub elapsed: Duration,
}

/// Source response timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Source name
    pub source: SourceId,
    /// Response time in milliseconds
    pub time_ms: u64,
    /// Number of rows returned (zero on failure)
    pub result_count: usize,
}

/// Merged rows of one search plus per-source bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateResult {
    /// Rows in source-processing order, then each source's own order
    pub rows: Vec<JobRecord>,
    /// Sources in the order they were processed
    pub source_order: Vec<SourceId>,
    /// Row counts of sources that answered
    pub per_source_counts: HashMap<SourceId, usize>,
    /// Errors of sources that failed
    pub per_source_errors: HashMap<SourceId, ProviderError>,
    pub timings: Vec<Timing>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl AggregateResult {
    /// Fold per-source outcomes, in plan order, into one result
    pub fn fold(outcomes: impl IntoIterator<Item = SourceOutcome>, elapsed: Duration) -> Self {
        let mut aggregate = Self {
            elapsed,
            ..Default::default()
        };

        for outcome in outcomes {
            aggregate.push(outcome);
        }

        aggregate
    }

    fn push(&mut self, outcome: SourceOutcome) {
        let SourceOutcome {
            source,
            result,
            elapsed,
        } = outcome;

        let result_count = match result {
            Ok(rows) => {
                let count = rows.len();
                self.per_source_counts.insert(source.clone(), count);
                self.rows.extend(rows);
                count
            }
            Err(error) => {
                self.per_source_errors.insert(source.clone(), error);
                0
            }
        };

        self.timings.push(Timing {
            source: source.clone(),
            time_ms: elapsed.as_millis() as u64,
            result_count,
        });
        self.source_order.push(source);
    }

    /// Total number of rows
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// No rows at all: every source failed or returned nothing
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every queried source failed
    pub fn all_failed(&self) -> bool {
        !self.source_order.is_empty() && self.per_source_counts.is_empty()
    }

    pub fn count(&self, source: &SourceId) -> Option<usize> {
        self.per_source_counts.get(source).copied()
    }

    pub fn error(&self, source: &SourceId) -> Option<&ProviderError> {
        self.per_source_errors.get(source)
    }

    /// Counts of answering sources in processing order
    pub fn ordered_counts(&self) -> Vec<(&SourceId, usize)> {
        self.source_order
            .iter()
            .filter_map(|id| self.per_source_counts.get(id).map(|c| (id, *c)))
            .collect()
    }

    /// Errors of failed sources in processing order
    pub fn ordered_errors(&self) -> Vec<(&SourceId, &ProviderError)> {
        self.source_order
            .iter()
            .filter_map(|id| self.per_source_errors.get(id).map(|e| (id, e)))
            .collect()
    }
}
