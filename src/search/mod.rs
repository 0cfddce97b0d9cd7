//! Search orchestration module
//!
//! Fans a search out across the selected sources, isolates their failures,
//! and folds the answers into one result.

mod aggregator;
mod models;

pub use aggregator::{Aggregator, ExecutionMode};
pub use models::*;
