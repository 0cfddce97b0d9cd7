//! Job records and aggregate results
//!
//! Defines the rows returned by sources, the folded aggregate result, and the
//! two ways a result leaves the process: a text summary and a CSV file.

mod export;
mod summary;
mod types;

pub use export::{to_csv_string, write_csv, CSV_HEADER};
pub use summary::{SearchSummary, NO_RESULTS_MESSAGE};
pub use types::*;
