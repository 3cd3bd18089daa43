//! Memoised loads keyed by their inputs.
//!
//! Loading is a pure function of path, key field, source and schema, so a
//! cached value stays valid until one of those changes or `clear()` is called.

use std::{path::{Path, PathBuf}, sync::{Arc, Mutex, MutexGuard}};

use ahash::AHashMap;
use anyhow::{anyhow, Result};

use crate::{
    config::{Config, Schema},
    error::Outcome,
    map::{load_shapes, load_sheet, merge, SheetSource, VillageLayer, VillageShapes, VillageSheet},
};

type ShapesKey = (PathBuf, String);
type SheetKey = (SheetSource, Schema);

#[derive(Debug, Default)]
pub struct LoadCache {
    shapes: Mutex<AHashMap<ShapesKey, Arc<Outcome<VillageShapes>>>>,
    sheets: Mutex<AHashMap<SheetKey, Arc<VillageSheet>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("[cache] lock poisoned"))
}

impl LoadCache {
    pub fn new() -> Self { Self::default() }

    /// Village shapes at `path` keyed by `key_field`, loaded on first request.
    /// Failed loads are not cached.
    pub fn shapes(&self, path: &Path, key_field: &str) -> Result<Arc<Outcome<VillageShapes>>> {
        let key = (path.to_path_buf(), key_field.to_string());
        if let Some(hit) = lock(&self.shapes)?.get(&key) {
            log::debug!("[cache] shapes hit for {}", path.display());
            return Ok(Arc::clone(hit))
        }
        let loaded = Arc::new(load_shapes(path, key_field)?);
        lock(&self.shapes)?.insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Normalised sheet from `source`, loaded on first request.
    pub fn sheet(&self, source: &SheetSource, schema: &Schema) -> Result<Arc<VillageSheet>> {
        let key = (source.clone(), schema.clone());
        if let Some(hit) = lock(&self.sheets)?.get(&key) {
            log::debug!("[cache] sheet hit for {source}");
            return Ok(Arc::clone(hit))
        }
        let loaded = Arc::new(load_sheet(source, schema)?);
        lock(&self.sheets)?.insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Merge cached inputs named by `config`. The merge itself is recomputed.
    pub fn layer(&self, config: &Config) -> Result<Outcome<VillageLayer>> {
        let shapes = self.shapes(&config.shapefile, &config.shapefile_key)?;
        let sheet = self.sheet(&SheetSource::parse(&config.sheet), &config.schema)?;
        let merged = merge(shapes.value.clone(), &sheet)?;
        let mut warnings = shapes.warnings.clone();
        warnings.extend(merged.warnings);
        Ok(Outcome::with_warnings(merged.value, warnings))
    }

    /// Drop every cached value.
    pub fn clear(&self) -> Result<()> {
        lock(&self.shapes)?.clear();
        lock(&self.sheets)?.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.shapes)?.len() + lock(&self.sheets)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sheet_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn repeated_sheet_loads_share_one_value() {
        let file = sheet_file("region_code,total_votes\nA1,10\n");
        let source = SheetSource::Path(file.path().to_path_buf());
        let cache = LoadCache::new();

        let first = cache.sheet(&source, &Schema::default()).unwrap();
        let second = cache.sheet(&source, &Schema::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn schema_change_is_a_new_entry() {
        let file = sheet_file("region_code,code,total_votes\nA1,B1,10\n");
        let source = SheetSource::Path(file.path().to_path_buf());
        let cache = LoadCache::new();

        let by_region = cache.sheet(&source, &Schema::default()).unwrap();
        let by_code = cache.sheet(&source, &Schema { key: "code".into(), ..Schema::default() }).unwrap();
        assert!(!Arc::ptr_eq(&by_region, &by_code));
        assert_eq!(by_code.keys().unwrap(), vec![Some("B1".to_string())]);
    }

    #[test]
    fn clear_forgets_and_failures_are_not_cached() {
        let file = sheet_file("region_code\nA1\n");
        let source = SheetSource::Path(file.path().to_path_buf());
        let cache = LoadCache::new();

        cache.sheet(&source, &Schema::default()).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());

        let missing = SheetSource::Path(PathBuf::from("does/not/exist.csv"));
        assert!(cache.sheet(&missing, &Schema::default()).is_err());
        assert!(cache.is_empty().unwrap());
    }
}
