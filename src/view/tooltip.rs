use anyhow::{ensure, Result};
use polars::{frame::DataFrame, prelude::*, series::Series};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{ac::weighted_column, config::Schema};

/// Fields shown on hover and the label of each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipSpec {
    pub fields: Vec<String>,
    pub aliases: Vec<String>,
    pub sticky: bool,
}

impl TooltipSpec {
    /// Names, constituencies, per-village shares, then demographic fields.
    pub fn village(schema: &Schema, demographics: &[String]) -> Self {
        let fields = schema.text_columns().iter().map(|c| c.to_string())
            .chain(schema.share_columns().into_iter().map(str::to_string))
            .chain(demographics.iter().cloned())
            .collect();
        let aliases = ["Village", "Subdistrict", "District", "AC (orig.)", "AC (dummy)"].into_iter()
            .map(str::to_string)
            .chain(schema.parties.iter().map(|p| format!("{} %", p.name)))
            .chain(demographics.iter().cloned())
            .collect();
        Self { fields, aliases, sticky: true }
    }

    /// Constituency key, recomputed shares, then weighted demographic averages.
    pub fn ac(group_column: &str, schema: &Schema, demographics: &[String]) -> Self {
        let fields = std::iter::once(group_column.to_string())
            .chain(schema.parties.iter().map(|p| p.aggregate_share()))
            .chain(demographics.iter().map(|d| weighted_column(d)))
            .collect();
        let aliases = std::iter::once("AC".to_string())
            .chain(schema.parties.iter().map(|p| format!("{} %", p.name)))
            .chain(demographics.iter().map(|d| {
                let stem = d.strip_suffix(schema.demographic_suffix.as_str()).unwrap_or(d);
                format!("{} % (weighted)", stem.to_uppercase())
            }))
            .collect();
        Self { fields, aliases, sticky: true }
    }

    /// Add every tooltip field missing from `df` as an all-null column.
    pub fn ensure_columns(&self, df: &mut DataFrame) -> Result<()> {
        let height = df.height();
        for field in &self.fields {
            if df.get_column_index(field).is_none() {
                df.with_column(Series::full_null(field.as_str().into(), height, &DataType::String))?;
            }
        }
        Ok(())
    }

    /// `(alias, value)` pairs of row `index`; absent fields are null.
    pub fn row(&self, df: &DataFrame, index: usize) -> Result<Vec<(String, Value)>> {
        ensure!(index < df.height(), "[tooltip] row {index} out of range for {} rows", df.height());
        self.fields.iter().zip(&self.aliases)
            .map(|(field, alias)| {
                let value = match df.get_column_index(field) {
                    Some(_) => column_values(&df.column(field)?.slice(index as i64, 1))?
                        .into_iter().next().unwrap_or(Value::Null),
                    None => Value::Null,
                };
                Ok((alias.clone(), value))
            })
            .collect()
    }
}

/// JSON values of a column: strings, booleans, numbers (non-finite as null).
pub(crate) fn column_values(column: &Column) -> Result<Vec<Value>> {
    let values = match column.dtype() {
        DataType::String => column.str()?.into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
            .collect(),
        DataType::Boolean => column.bool()?.into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::Null => vec![Value::Null; column.len()],
        dtype if dtype.is_primitive_numeric() => column.cast(&DataType::Float64)?.f64()?.into_iter()
            .map(|v| v.map_or(Value::Null, |x| json!(x)))
            .collect(),
        _ => column.cast(&DataType::String)?.str()?.into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
            .collect(),
    };
    Ok(values)
}

/// One property map per row holding every column of `df`.
pub(crate) fn row_properties(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    let mut rows = vec![Map::new(); df.height()];
    for column in df.get_columns() {
        for (row, value) in rows.iter_mut().zip(column_values(column)?) {
            row.insert(column.name().to_string(), value);
        }
    }
    Ok(rows)
}
