//! Incremental CSV dataset.
//!
//! Each date window appends its records as soon as it finishes, so an
//! interrupted run keeps everything collected so far. The header row is
//! written only when the file does not exist yet; reruns and later windows
//! append plain rows.

use crate::models::ArticleRecord;
use csv::WriterBuilder;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::info;

/// Append `records` to the CSV file at `path`, creating it on first use.
pub fn append_records(path: &Path, records: &[ArticleRecord]) -> Result<(), Box<dyn Error>> {
    if records.is_empty() {
        return Ok(());
    }

    let write_header = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(write_header).from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(
        path = %path.display(),
        appended = records.len(),
        "Wrote dataset rows"
    );
    Ok(())
}
