//! User-facing search summary

use super::types::AggregateResult;
use std::fmt;

/// Message shown when a search produced no rows
pub const NO_RESULTS_MESSAGE: &str =
    "No jobs found matching your criteria. Try adjusting your search parameters.";

/// Short report derived from an aggregate result
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub total: usize,
    pub elapsed_secs: f64,
    /// `(display name, count)` for sources that returned rows, largest first
    pub by_source: Vec<(String, usize)>,
    /// `(source, error)` for sources that failed
    pub failures: Vec<(String, String)>,
}

impl SearchSummary {
    pub fn from_result(result: &AggregateResult) -> Self {
        let mut by_source: Vec<(String, usize)> = result
            .ordered_counts()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, count)| (id.display_name(), count))
            .collect();
        // Stable sort keeps processing order among equal counts.
        by_source.sort_by(|a, b| b.1.cmp(&a.1));

        let failures = result
            .ordered_errors()
            .into_iter()
            .map(|(id, err)| (id.to_string(), err.to_string()))
            .collect();

        Self {
            total: result.total(),
            elapsed_secs: result.elapsed.as_secs_f64(),
            by_source,
            failures,
        }
    }
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            f.write_str(NO_RESULTS_MESSAGE)?;
        } else {
            writeln!(
                f,
                "Found {} jobs in {:.2} seconds!\n",
                self.total, self.elapsed_secs
            )?;
            writeln!(f, "Jobs by site:")?;
            for (site, count) in &self.by_source {
                writeln!(f, "- {}: {} jobs", site, count)?;
            }
        }

        if !self.failures.is_empty() {
            write!(f, "\nFailed sites:")?;
            for (site, error) in &self.failures {
                write!(f, "\n- {}: {}", site, error)?;
            }
        }

        Ok(())
    }
}
