//! CSV export of job records

use super::types::JobRecord;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Column order of the CSV artifact
pub const CSV_HEADER: [&str; 6] = ["title", "company", "location", "date_posted", "site", "job_url"];

fn write_rows<W: Write>(writer: W, rows: &[JobRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Render rows as CSV text, header included
pub fn to_csv_string(rows: &[JobRecord]) -> Result<String> {
    if rows.is_empty() {
        return Ok(format!("{}\n", CSV_HEADER.join(",")));
    }

    let mut buf = Vec::new();
    write_rows(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}

/// Write rows to `path`. Returns `false` and leaves no file behind when there are no rows.
pub fn write_csv(path: &Path, rows: &[JobRecord]) -> Result<bool> {
    if rows.is_empty() {
        if path.exists() {
            debug!("Removing stale results file {}", path.display());
            std::fs::remove_file(path)?;
        }
        return Ok(false);
    }

    let file = std::fs::File::create(path)?;
    write_rows(file, rows)?;
    info!("Saved {} jobs to {}", rows.len(), path.display());
    Ok(true)
}
