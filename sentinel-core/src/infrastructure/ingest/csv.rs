// sentinel-core/src/infrastructure/ingest/csv.rs

use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::dataset::{Cell, Dataset};
use crate::domain::error::DomainError;
use crate::domain::project::IngestConfig;
use crate::error::SentinelError;

/// Reads a CSV file into a [`Dataset`].
#[instrument(skip(config))]
pub fn read_csv_path(path: &Path, config: &IngestConfig) -> Result<Dataset, SentinelError> {
    let file = File::open(path)?;
    let dataset = read_csv(file, config)?;
    debug!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "CSV loaded"
    );
    Ok(dataset)
}

/// Reads CSV text into a [`Dataset`].
///
/// The first record is the header. Short rows are padded with missing cells,
/// long rows are rejected. Null markers become missing cells, while an empty
/// field stays an empty string.
pub fn read_csv<R: Read>(reader: R, config: &IngestConfig) -> Result<Dataset, SentinelError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(config.delimiter as u8)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();
    if columns.is_empty() {
        return Err(DomainError::NoColumns.into());
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(DomainError::RaggedRow {
                row: idx + 1,
                expected: columns.len(),
                found: record.len(),
            }
            .into());
        }

        let mut row: Vec<Cell> = record
            .iter()
            .map(|value| {
                let is_marker = config.null_markers.iter().any(|m| m == value.trim());
                (!is_marker).then(|| value.to_string())
            })
            .collect();
        row.resize(columns.len(), None);
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows)?)
}

/// Writes a dataset as CSV. Missing cells become empty fields.
#[instrument(skip(dataset, config), fields(rows = dataset.row_count()))]
pub fn write_csv_path(
    path: &Path,
    dataset: &Dataset,
    config: &IngestConfig,
) -> Result<(), SentinelError> {
    let mut writer = WriterBuilder::new()
        .delimiter(config.delimiter as u8)
        .from_path(path)?;

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
