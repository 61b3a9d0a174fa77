// sentinel-core/src/domain/dataset.rs

use std::collections::{BTreeMap, HashSet};

use crate::domain::error::DomainError;

/// A single cell. `None` is a missing value, distinct from `Some("")`.
pub type Cell = Option<String>;

/// A row rendered as a column-name keyed mapping (used for sample rows in reports).
pub type SampleRow = BTreeMap<String, Option<String>>;

/// In-memory, immutable representation of a parsed CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Builds a dataset from a header and positional rows.
    ///
    /// Rejects an empty header, duplicate column names and rows whose width
    /// differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, DomainError> {
        if columns.is_empty() {
            return Err(DomainError::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DomainError::DuplicateColumn(name.clone()));
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DomainError::RaggedRow {
                    row: idx + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Builds a dataset from name-keyed records. Columns absent from a record are missing.
    pub fn from_records(
        columns: Vec<String>,
        records: Vec<BTreeMap<String, Cell>>,
    ) -> Result<Self, DomainError> {
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).flatten())
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-sensitive exact lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Raw value of a cell; `None` when missing or out of bounds.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Iterates `(row_index, value)` over one column.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = (usize, Option<&str>)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, r)| (idx, r.get(column).and_then(|c| c.as_deref())))
    }

    /// Non-missing, non-empty values of one column with their row index.
    pub fn present_values(&self, column: usize) -> impl Iterator<Item = (usize, &str)> {
        self.column_values(column)
            .filter_map(|(idx, v)| v.filter(|s| !s.is_empty()).map(|s| (idx, s)))
    }

    pub fn sample_row(&self, row: usize) -> SampleRow {
        let cells = self.rows.get(row);
        self.columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let value = cells.and_then(|r| r.get(col)).cloned().flatten();
                (name.clone(), value)
            })
            .collect()
    }
}

/// True when the cell is missing or the empty string.
pub fn is_null(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}
