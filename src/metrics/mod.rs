//! Metrics collection module
//!
//! Tracks per-source response times, error rates and row counts.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of response times kept per source
const WINDOW: usize = 100;

#[derive(Debug, Default)]
struct SourceCounters {
    queries: u64,
    successes: u64,
    errors: u64,
    rows: u64,
    response_times: Vec<u64>,
}

/// In-process metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total aggregate searches
    total_searches: AtomicU64,
    /// Searches rejected before any source was queried
    rejected_searches: AtomicU64,
    sources: RwLock<HashMap<String, SourceCounters>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment rejected search count
    pub fn inc_rejected(&self) {
        self.rejected_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one source query
    pub fn record_source(&self, source: &str, time_ms: u64, rows: Option<usize>) {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        let entry = sources.entry(source.to_string()).or_default();

        entry.queries += 1;
        match rows {
            Some(n) => {
                entry.successes += 1;
                entry.rows += n as u64;
            }
            None => entry.errors += 1,
        }

        if entry.response_times.len() >= WINDOW {
            entry.response_times.remove(0);
        }
        entry.response_times.push(time_ms);
    }

    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    pub fn get_rejected_searches(&self) -> u64 {
        self.rejected_searches.load(Ordering::Relaxed)
    }

    /// Statistics for one source
    pub fn get_source_stats(&self, source: &str) -> Option<SourceStats> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.get(source).map(SourceStats::from_counters)
    }

    /// Statistics for every source seen so far
    pub fn get_all_stats(&self) -> HashMap<String, SourceStats> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources
            .iter()
            .map(|(name, counters)| (name.clone(), SourceStats::from_counters(counters)))
            .collect()
    }
}

/// Statistics for a single source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub queries: u64,
    pub rows: u64,
    pub avg_response_time: Option<u64>,
    /// Share of successful queries in percent
    pub reliability: f64,
}

impl SourceStats {
    fn from_counters(counters: &SourceCounters) -> Self {
        let avg_response_time = if counters.response_times.is_empty() {
            None
        } else {
            Some(counters.response_times.iter().sum::<u64>() / counters.response_times.len() as u64)
        };

        let total = counters.successes + counters.errors;
        let reliability = if total == 0 {
            100.0
        } else {
            (counters.successes as f64 / total as f64) * 100.0
        };

        Self {
            queries: counters.queries,
            rows: counters.rows,
            avg_response_time,
            reliability,
        }
    }
}
