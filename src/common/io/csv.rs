use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};

use crate::{PipelineError, common::PendingWrite};

/// Reads a header-delimited CSV with every column kept as a string.
pub(crate) fn read_csv_strings(path: &Path) -> Result<DataFrame, PipelineError> {
    let file = File::open(path)
        .map_err(|source| PipelineError::io(path, source))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|source| PipelineError::Csv { path: path.to_path_buf(), source })
}

/// Writes a DataFrame as CSV with a header row, nulls as empty strings and no index column.
pub(crate) fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut sink = PendingWrite::open(path)?;
    CsvWriter::new(&mut sink)
        .include_header(true)
        .with_null_value(String::new())
        .finish(&mut df.clone())
        .with_context(|| format!("[io::csv] Failed to write CSV to {}", path.display()))?;
    sink.finalize()
}
