//! CSV writing of summary tables.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use polars::{error::PolarsResult, frame::DataFrame, io::SerWriter, prelude::CsvWriter};

fn write_table<W: Write>(df: &mut DataFrame, sink: W) -> PolarsResult<()> {
    CsvWriter::new(sink).include_header(true).finish(df)
}

/// Write a table to `path`, replacing any existing file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    let mut sink = BufWriter::new(file);
    write_table(df, &mut sink)
        .with_context(|| format!("[io::csv::write] Failed to write {} rows to {}", df.height(), path.display()))?;
    sink.flush()?;
    Ok(())
}

/// Render a table as CSV text.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(df, &mut buffer).context("[io::csv::write] Failed to serialise table")?;
    String::from_utf8(buffer).context("[io::csv::write] CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn header_then_rows_with_empty_nulls() {
        let mut df = DataFrame::new(vec![
            Column::new("AC_name".into(), [Some("Tenali"), None]),
            Column::new("TDP_share".into(), [55.0, 0.0]),
        ]).unwrap();
        assert_eq!(write_csv_string(&mut df).unwrap(), "AC_name,TDP_share\nTenali,55.0\n,0.0\n");
    }

    #[test]
    fn file_matches_string() {
        let mut df = DataFrame::new(vec![Column::new("a".into(), [1i64, 2])]).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        write_csv(&mut df, file.path()).unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), write_csv_string(&mut df).unwrap());
    }
}
