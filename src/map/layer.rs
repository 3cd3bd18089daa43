use anyhow::Result;
use polars::frame::DataFrame;

use crate::{config::Schema, geom::Geometries};
use super::sheet::{numeric_values, text_values};

/// How geometry rows relate to sheet rows in a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinCardinality {
    /// Every geometry key is unique.
    OneToOne,
    /// Some key is shared by several geometry rows (multipart villages).
    ManyToOne,
}

/// Village polygons with their sheet attributes, one data row per geometry.
#[derive(Debug, Clone)]
pub struct VillageLayer {
    geoms: Geometries,
    data: DataFrame,
    schema: Schema,
    demographics: Vec<String>,
    cardinality: JoinCardinality,
}

impl VillageLayer {
    pub(crate) fn new(
        geoms: Geometries,
        data: DataFrame,
        schema: Schema,
        demographics: Vec<String>,
        cardinality: JoinCardinality,
    ) -> Self {
        debug_assert_eq!(geoms.len(), data.height());
        Self { geoms, data, schema, demographics, cardinality }
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    /// Attribute rows, index-aligned with `geoms()`.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn schema(&self) -> &Schema { &self.schema }

    #[inline] pub fn demographics(&self) -> &[String] { &self.demographics }

    #[inline] pub fn cardinality(&self) -> JoinCardinality { self.cardinality }

    #[inline] pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_index(name).is_some()
    }

    /// Region keys per row.
    pub fn keys(&self) -> Result<Vec<Option<String>>> {
        self.text_values(&self.schema.key)
    }

    /// Text values of `column`, or all-null when the column is absent.
    pub fn text_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        match self.data.get_column_index(column) {
            Some(_) => text_values(self.data.column(column)?),
            None => Ok(vec![None; self.len()]),
        }
    }

    /// Numeric values of `column`, or all-null when the column is absent.
    pub fn number_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        match self.data.get_column_index(column) {
            Some(_) => Ok(numeric_values(self.data.column(column)?)?.into_iter().collect()),
            None => Ok(vec![None; self.len()]),
        }
    }
}
