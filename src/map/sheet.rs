use std::{fmt, path::{Path, PathBuf}};

use anyhow::{bail, ensure, Result};
use polars::{frame::DataFrame, prelude::*, series::Series};

use crate::{config::Schema, io::csv, key::normalize_key};

/// Where the sheet comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SheetSource {
    Url(String),
    Path(PathBuf),
}

impl SheetSource {
    /// `http(s)://` strings are URLs, anything else is a local path.
    pub fn parse(value: &str) -> Self {
        let lower = value.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SheetSource::Url(value.trim().to_string())
        } else {
            SheetSource::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for SheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSource::Url(url) => write!(f, "{url}"),
            SheetSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Village rows from the sheet after schema normalisation.
///
/// Every column named by the schema is present: the key and descriptive
/// columns as strings, vote and demographic columns as `f64` (null where the
/// sheet holds no number).
#[derive(Debug, Clone)]
pub struct VillageSheet {
    data: DataFrame,
    schema: Schema,
    demographics: Vec<String>,
}

impl VillageSheet {
    /// Normalise a sheet whose columns may be text or already typed.
    pub fn from_dataframe(mut df: DataFrame, schema: &Schema) -> Result<Self> {
        let height = df.height();
        ensure!(
            df.get_column_index(&schema.key).is_some(),
            "[sheet] key column {:?} not found in sheet", schema.key
        );

        let demographics = schema.detect_demographics(
            df.get_column_names().into_iter().map(|name| name.as_str())
        );

        // Join key: raw text through the normaliser.
        let keys = text_values(df.column(&schema.key)?)?.into_iter()
            .map(|key| normalize_key(key.as_deref()))
            .collect::<StringChunked>()
            .with_name(schema.key.as_str().into());
        df.with_column(keys.into_series())?;

        // Dummy constituency defaults to the official one, else empty.
        if df.get_column_index(&schema.dummy_ac).is_none() {
            let dummy = if df.get_column_index(&schema.ac).is_some() {
                let mut column = df.column(&schema.ac)?.clone();
                column.rename(schema.dummy_ac.as_str().into());
                column
            } else {
                Column::new(schema.dummy_ac.as_str().into(), vec![""; height])
            };
            df.with_column(dummy)?;
        }

        for name in schema.text_columns() {
            let series = match df.get_column_index(name) {
                Some(_) => text_values(df.column(name)?)?.into_iter()
                    .collect::<StringChunked>()
                    .with_name(name.into())
                    .into_series(),
                None => Series::full_null(name.into(), height, &DataType::String),
            };
            df.with_column(series)?;
        }

        let numeric = schema.vote_columns().into_iter()
            .map(str::to_string)
            .chain(demographics.iter().cloned())
            .collect::<Vec<_>>();
        for name in &numeric {
            let series = match df.get_column_index(name) {
                Some(_) => numeric_values(df.column(name)?)?
                    .with_name(name.as_str().into())
                    .into_series(),
                None => Series::full_null(name.as_str().into(), height, &DataType::Float64),
            };
            df.with_column(series)?;
        }

        Ok(Self { data: df, schema: schema.clone(), demographics })
    }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn schema(&self) -> &Schema { &self.schema }

    /// Demographic percentage fields present in this sheet.
    #[inline] pub fn demographics(&self) -> &[String] { &self.demographics }

    #[inline] pub fn len(&self) -> usize { self.data.height() }

    #[inline] pub fn is_empty(&self) -> bool { self.data.height() == 0 }

    /// Normalised keys, in row order.
    pub fn keys(&self) -> Result<Vec<Option<String>>> {
        text_values(self.data.column(&self.schema.key)?)
    }
}

/// Fetch or read the sheet at `source` and normalise it.
pub fn load_sheet(source: &SheetSource, schema: &Schema) -> Result<VillageSheet> {
    log::info!("[load_sheet] reading {source}");
    let df = match source {
        SheetSource::Path(path) => read_local(path)?,
        SheetSource::Url(url) => read_remote(url)?,
    };
    let sheet = VillageSheet::from_dataframe(df, schema)?;
    log::info!(
        "[load_sheet] {} rows, demographic fields {:?}",
        sheet.len(), sheet.demographics()
    );
    Ok(sheet)
}

/// Save a snapshot of a remote sheet to `out`, atomically.
#[cfg(feature = "download")]
pub fn fetch_sheet(source: &SheetSource, out: &Path, force: bool) -> Result<()> {
    match source {
        SheetSource::Url(url) => {
            log::info!("[fetch_sheet] {url} -> {}", out.display());
            crate::io::download::download_file(url, out, force)
        }
        SheetSource::Path(path) => bail!("[fetch_sheet] {} is already a local file", path.display()),
    }
}

fn read_local(path: &Path) -> Result<DataFrame> {
    csv::read_csv_text(path)
}

#[cfg(feature = "download")]
fn read_remote(url: &str) -> Result<DataFrame> {
    csv::read_csv_text_bytes(crate::io::download::fetch_bytes(url)?)
}

#[cfg(not(feature = "download"))]
fn read_remote(url: &str) -> Result<DataFrame> {
    bail!("[load_sheet] cannot fetch {url}: built without the `download` feature")
}

/// Column values as owned text, casting non-string columns.
pub(crate) fn text_values(column: &Column) -> Result<Vec<Option<String>>> {
    let column = if column.dtype() == &DataType::String {
        column.clone()
    } else {
        column.cast(&DataType::String)?
    };
    Ok(column.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Column values as `f64`; text that is not a finite number becomes null.
pub(crate) fn numeric_values(column: &Column) -> Result<Float64Chunked> {
    if column.dtype() == &DataType::String {
        return Ok(column.str()?.into_iter().map(|v| v.and_then(parse_number)).collect())
    }
    if !column.dtype().is_primitive_numeric() && column.dtype() != &DataType::Null {
        bail!("[sheet] column {:?} has non-numeric type {}", column.name(), column.dtype());
    }
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().map(|v| v.filter(|x| x.is_finite())).collect())
}

#[inline]
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(csv_text: &str) -> VillageSheet {
        let df = csv::read_csv_text_bytes(csv_text.as_bytes().to_vec()).unwrap();
        VillageSheet::from_dataframe(df, &Schema::default()).unwrap()
    }

    #[test]
    fn source_kind_follows_scheme() {
        assert!(matches!(SheetSource::parse("https://example.org/pub?output=csv"), SheetSource::Url(_)));
        assert!(matches!(SheetSource::parse("HTTP://example.org/a.csv"), SheetSource::Url(_)));
        assert!(matches!(SheetSource::parse("data/villages.csv"), SheetSource::Path(_)));
    }

    #[test]
    fn keys_are_normalised_text() {
        let s = sheet("region_code,AC_name,total_votes\n a1 ,X,50\n0012,Y,10\n");
        assert_eq!(s.keys().unwrap(), vec![Some("A1".to_string()), Some("0012".to_string())]);
    }

    #[test]
    fn dummy_copies_official_constituency() {
        let s = sheet("region_code,AC_name\nA1,Tenali\nA2,\n");
        let dummy = s.data().column("dummy_ac").unwrap().str().unwrap();
        assert_eq!(dummy.get(0), Some("Tenali"));
        assert_eq!(dummy.get(1), s.data().column("AC_name").unwrap().str().unwrap().get(1));
    }

    #[test]
    fn dummy_is_empty_without_any_constituency() {
        let s = sheet("region_code,total_votes\nA1,5\n");
        assert_eq!(s.data().column("dummy_ac").unwrap().str().unwrap().get(0), Some(""));
        assert_eq!(s.data().column("AC_name").unwrap().str().unwrap().get(0), None);
    }

    #[test]
    fn existing_dummy_is_kept() {
        let s = sheet("region_code,AC_name,dummy_ac\nA1,Tenali,Ponnur\n");
        assert_eq!(s.data().column("dummy_ac").unwrap().str().unwrap().get(0), Some("Ponnur"));
    }

    #[test]
    fn numeric_columns_coerce_bad_values_to_null() {
        let s = sheet("region_code,total_votes,TDP_votes,SC_pct\nA1, 120 ,abc,12.5\nA2,,7,n/a\n");
        let total = s.data().column("total_votes").unwrap().f64().unwrap();
        assert_eq!(total.get(0), Some(120.0));
        assert_eq!(total.get(1), None);
        let tdp = s.data().column("TDP_votes").unwrap().f64().unwrap();
        assert_eq!(tdp.get(0), None);
        assert_eq!(tdp.get(1), Some(7.0));
        let sc = s.data().column("SC_pct").unwrap().f64().unwrap();
        assert_eq!(sc.get(0), Some(12.5));
        assert_eq!(sc.get(1), None);
    }

    #[test]
    fn schema_columns_exist_even_when_absent() {
        let s = sheet("region_code\nA1\n");
        for name in ["village_name", "subdistrict", "district", "AC_name", "dummy_ac"] {
            assert_eq!(s.data().column(name).unwrap().dtype(), &DataType::String, "{name}");
        }
        for name in ["total_votes", "TDP_votes", "Others_votes", "TDP_vote_share", "Others"] {
            assert_eq!(s.data().column(name).unwrap().dtype(), &DataType::Float64, "{name}");
        }
        assert!(s.demographics().is_empty());
    }

    #[test]
    fn demographics_are_detected() {
        let s = sheet("region_code,BC_pct,SC_pct,Kapu_pct\nA1,1,2,3\n");
        assert_eq!(s.demographics(), &["SC_pct", "BC_pct", "Kapu_pct"]);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let df = csv::read_csv_text_bytes(b"village_name\nX\n".to_vec()).unwrap();
        assert!(VillageSheet::from_dataframe(df, &Schema::default()).is_err());
    }
}
