//! MergedTable - Sync Engine output
//!
//! One row per grid instant, one column per retained channel of both streams.

use serde::{Deserialize, Serialize};

use crate::{ChannelCategory, ContractError, Micros, StreamKind};

/// Reconstructed column of the merged table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedColumn {
    /// Output column name
    pub name: String,

    /// Category, drives output precision
    pub category: ChannelCategory,

    /// Stream the column was reconstructed from
    pub source: StreamKind,

    /// One value per row, `NAN` when missing
    pub values: Vec<f64>,
}

/// Synchronized, grid-indexed table
///
/// Invariant: every column holds exactly `timestamps.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    timestamps: Vec<Micros>,
    columns: Vec<MergedColumn>,
}

impl MergedTable {
    pub fn new(timestamps: Vec<Micros>, columns: Vec<MergedColumn>) -> Result<Self, ContractError> {
        let expected = timestamps.len();
        if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
            return Err(ContractError::shape(&bad.name, expected, bad.values.len()));
        }
        Ok(Self {
            timestamps,
            columns,
        })
    }

    /// Canonical timestamps, one per row
    pub fn timestamps(&self) -> &[Micros] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[MergedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&MergedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Whether every channel of `row` is missing
    pub fn row_is_empty(&self, row: usize) -> bool {
        self.columns.iter().all(|c| c.values[row].is_nan())
    }

    /// Whether any channel of `row` is missing
    pub fn row_has_missing(&self, row: usize) -> bool {
        self.columns.iter().any(|c| c.values[row].is_nan())
    }

    /// Keep only the first `rows` rows
    pub fn truncate(&mut self, rows: usize) {
        self.timestamps.truncate(rows);
        for column in &mut self.columns {
            column.values.truncate(rows);
        }
    }

    /// Keep rows for which `keep(row)` is true, returning how many were removed
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Self, usize) -> bool) -> usize {
        let mask: Vec<bool> = (0..self.row_count()).map(|row| keep(self, row)).collect();
        let before = self.row_count();

        self.timestamps = filter_by_mask(&self.timestamps, &mask);
        for column in &mut self.columns {
            column.values = filter_by_mask(&column.values, &mask);
        }

        before - self.row_count()
    }
}

fn filter_by_mask<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(v, &keep)| keep.then_some(*v))
        .collect()
}
