//! jobscout: a job listing aggregator
//!
//! Sends one job search to several job boards, keeps going when some of them
//! fail, and merges whatever comes back into a single table.

pub mod config;
pub mod metrics;
pub mod network;
pub mod proxy;
pub mod results;
pub mod search;
pub mod sources;
pub mod web;

pub use config::Settings;
pub use results::{AggregateResult, JobRecord, SearchSummary};
pub use search::{Aggregator, ConfigurationError, ExecutionMode, SearchRequest};
pub use sources::{ProviderError, SourceId, SourceProvider};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
