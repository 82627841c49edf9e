//! CSV export of entry DTOs.

use thiserror::Error;

use crate::entry::LogbookEntryDto;

/// File name offered to clients downloading the export.
pub const CSV_FILE_NAME: &str = "LogbookEntries.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV: {0}")]
    Flush(String),
}

/// Serializes entries to CSV bytes with a header row.
///
/// An empty slice still yields the header. Fields containing commas, quotes
/// or newlines are quoted.
pub fn entries_to_csv(entries: &[LogbookEntryDto]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["id", "activity", "description", "entry_date", "updated_at"])?;
    for entry in entries {
        writer.write_record([
            entry.id.to_string(),
            entry.activity.clone(),
            entry.description.clone().unwrap_or_default(),
            entry.entry_date.format("%Y-%m-%d").to_string(),
            entry.updated_at.to_rfc3339(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}
