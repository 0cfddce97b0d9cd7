//! HTTP networking module
//!
//! Provides the shared HTTP client used by remote sources and the proxy fetcher.

mod client;

pub use client::{HttpClient, HttpResponse};
