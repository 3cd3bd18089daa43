use thiserror::Error;

/// Failures that abort a load or merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The sheet repeats a region key, so a left join would duplicate village rows
    /// and inflate vote totals.
    #[error("[merge] sheet column {column:?} repeats region keys {keys:?}; join would fan out")]
    FanOut { column: String, keys: Vec<String> },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("[load_shapes] key field {field:?} not found in {path}")]
    MissingKeyField { field: String, path: String },

    #[error("[load_shapes] unsupported shape type {shape_type} at record {index}")]
    UnsupportedShape { shape_type: String, index: usize },
}

/// Recoverable conditions: the operation went ahead with a default and the
/// caller decides whether to show them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("coordinate reference system unknown ({reason}); geometry left as read")]
    UnknownCrs { reason: String },

    #[error("reprojection from EPSG:{from} to EPSG:4326 failed ({reason}); geometry left as read")]
    Reprojection { from: u32, reason: String },

    #[error("{count} of {total} geometry rows have no matching sheet row")]
    UnmatchedKeys { count: usize, total: usize },

    #[error("{count} records have no geometry")]
    NullGeometry { count: usize },

    #[error("could not fit viewport to layer bounds ({reason}); using default view")]
    ViewportFit { reason: String },
}

/// A value together with the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool { self.warnings.is_empty() }

    /// Transform the value, keeping warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome { value: f(self.value), warnings: self.warnings }
    }

    /// Log every warning through `log::warn!` and return the value.
    pub fn into_logged(self, stage: &str) -> T {
        for warning in &self.warnings {
            log::warn!("[{stage}] {warning}");
        }
        self.value
    }
}
