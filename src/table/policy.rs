use std::path::Path;

use anyhow::Result;
use polars::prelude::{BooleanChunked, Column, DataFrame, DataType};

use crate::{PipelineError, common};

/// The per-state policy/outcome table.
///
/// Input columns are kept as the raw strings read from disk, in their original order;
/// derived columns are appended by later stages. Every stage builds a new table rather
/// than mutating the one it was given.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    data: DataFrame,
}

impl PolicyTable {
    /// Read a header-delimited CSV, keeping every column as a string.
    pub fn read_csv(path: &Path) -> Result<Self, PipelineError> {
        let data = common::read_csv_strings(path)?;
        log::info!("[load] {} rows x {} columns from {}", data.height(), data.width(), path.display());
        Ok(Self { data })
    }

    /// Wrap an existing DataFrame.
    pub fn from_dataframe(data: DataFrame) -> Self { Self { data } }

    /// Write the table as CSV: header row, empty string for missing values, no index column.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        common::write_csv(&self.data, path)?;
        log::info!("[export] wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Get a reference to the underlying DataFrame.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Number of records.
    #[inline] pub fn len(&self) -> usize { self.data.height() }

    #[inline] pub fn is_empty(&self) -> bool { self.data.height() == 0 }

    /// Column names, in order.
    pub fn column_names(&self) -> Vec<String> {
        self.data.get_column_names().iter().map(|name| name.to_string()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Fail with `MissingColumn` naming the first absent column.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), PipelineError> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(name) => Err(PipelineError::MissingColumn(name.to_string())),
            None => Ok(()),
        }
    }

    fn column(&self, name: &str) -> Result<&Column, PipelineError> {
        self.data.column(name)
            .map_err(|_| PipelineError::MissingColumn(name.to_string()))
    }

    /// String view of a column; non-string columns are formatted.
    pub fn text(&self, name: &str) -> Result<Vec<Option<String>>, PipelineError> {
        let column = self.column(name)?;
        let column = if column.dtype() == &DataType::String { column.clone() } else { column.cast(&DataType::String)? };
        Ok(column.str()?
            .into_iter()
            .map(|value| value.map(|s| s.trim().to_string()))
            .collect())
    }

    /// Numeric view of a column. Raw string cells go through [`parse_number`];
    /// a cell that is neither missing nor numeric is a `MalformedValue` error.
    pub fn numeric(&self, name: &str) -> Result<Vec<Option<f64>>, PipelineError> {
        let column = self.column(name)?;
        if column.dtype() == &DataType::String {
            column.str()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(raw) => parse_number(raw).ok_or_else(|| PipelineError::MalformedValue {
                        column: name.to_string(),
                        row,
                        value: raw.to_string(),
                    }),
                })
                .collect()
        } else {
            Ok(column.cast(&DataType::Float64)?.f64()?.into_iter().collect())
        }
    }

    /// A new table without the rows whose `column` equals `value` exactly.
    pub fn excluding(&self, column: &str, value: &str) -> Result<Self, PipelineError> {
        let keep = self.text(column)?
            .iter()
            .map(|cell| cell.as_deref() != Some(value))
            .collect::<BooleanChunked>();
        Ok(Self { data: self.data.filter(&keep)? })
    }

    /// A new table with `columns` appended (or replacing same-named columns).
    pub(crate) fn with_columns(&self, columns: Vec<Column>) -> Result<Self, PipelineError> {
        let mut data = self.data.clone();
        for column in columns {
            data.with_column(column)?;
        }
        Ok(Self { data })
    }
}

/// Parse a raw numeric cell.
///
/// Returns `Some(None)` for a missing cell (empty, `NA`, `N/A`, `.`), `Some(Some(x))` for a
/// number, and `None` when the cell is not numeric. A leading `$`, a trailing `%` and
/// thousands separators are ignored.
pub fn parse_number(raw: &str) -> Option<Option<f64>> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("NA") || s.eq_ignore_ascii_case("N/A") || s == "." {
        return Some(None);
    }
    let s = s.strip_prefix('$').unwrap_or(s);
    let s = s.strip_suffix('%').unwrap_or(s);
    s.trim().replace(',', "").parse::<f64>().ok().map(Some)
}
