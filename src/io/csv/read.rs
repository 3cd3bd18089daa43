//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

/// Options reading every column as text, so ids such as `0123` keep their form.
fn text_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Reads a CSV file from `path` into a Polars DataFrame of string columns.
pub(crate) fn read_csv_text(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    text_options()
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads CSV bytes (a fetched sheet) into a Polars DataFrame of string columns.
pub(crate) fn read_csv_text_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(bytes))
        .with_options(text_options())
        .finish()
        .context("[io::csv::read] Failed to read CSV from bytes")
}
