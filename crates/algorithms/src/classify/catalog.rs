//! Validated feature raster catalog

use crate::classify::resolver::{resolve, FeatureVariable};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use vegclass_core::io::{read_geotiff, read_geotiff_meta, read_geotiff_rows};
use vegclass_core::raster::{GeoTransform, Raster};
use vegclass_core::{Error, Result};

/// The complete set of 22 co-registered feature rasters.
///
/// Construction fails unless every [`FeatureVariable`] is present and all
/// rasters share the same dimensions; afterwards the catalog is read-only,
/// so downstream stages can sample and window freely without re-checking.
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    paths: BTreeMap<FeatureVariable, PathBuf>,
    rows: usize,
    cols: usize,
    transform: GeoTransform,
}

impl FeatureCatalog {
    /// Build a catalog by scanning a directory.
    ///
    /// File names are resolved through [`resolve`]; unrecognized files are
    /// skipped silently. The first match wins if a variable somehow
    /// resolves twice.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = BTreeMap::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(var) = resolve(name) {
                paths.entry(var).or_insert_with(|| entry.path());
            }
        }

        Self::from_paths(paths)
    }

    /// Build a catalog from an explicit variable → path map
    pub fn from_paths(paths: BTreeMap<FeatureVariable, PathBuf>) -> Result<Self> {
        for var in FeatureVariable::ALL {
            if !paths.contains_key(&var) {
                return Err(Error::MissingInput(format!(
                    "feature raster {} ({})",
                    var.name(),
                    var.file_name()
                )));
            }
        }

        let mut shape: Option<(usize, usize)> = None;
        let mut transform = GeoTransform::default();

        for (var, path) in &paths {
            let meta = read_geotiff_meta(path)?;
            match shape {
                None => shape = Some((meta.rows, meta.cols)),
                Some((rows, cols)) => {
                    if (meta.rows, meta.cols) != (rows, cols) {
                        return Err(Error::SizeMismatch {
                            er: rows,
                            ec: cols,
                            ar: meta.rows,
                            ac: meta.cols,
                        });
                    }
                }
            }
            // The classification output inherits the Pan georeference.
            if *var == FeatureVariable::Pan {
                if let Some(gt) = meta.transform {
                    transform = gt;
                }
            }
        }

        let (rows, cols) = shape.ok_or_else(|| Error::Other("empty feature catalog".into()))?;
        Ok(Self {
            paths,
            rows,
            cols,
            transform,
        })
    }

    /// Dimensions shared by all feature rasters, as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Georeference of the feature set (taken from the Pan raster)
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Path of one feature raster
    pub fn path(&self, var: FeatureVariable) -> &Path {
        &self.paths[&var]
    }

    /// Read one full feature band
    pub fn read_band(&self, var: FeatureVariable) -> Result<Raster<f32>> {
        read_geotiff(self.path(var))
    }

    /// Read rows `[start, end)` of one feature band
    pub fn read_rows(&self, var: FeatureVariable, start: usize, end: usize) -> Result<Raster<f32>> {
        read_geotiff_rows(self.path(var), start, end)
    }

    /// Read a single pixel from one feature band.
    ///
    /// Decodes only the strip containing the row; used for the sparse
    /// access pattern of training-point sampling.
    pub fn read_pixel(&self, var: FeatureVariable, row: usize, col: usize) -> Result<f32> {
        let window: Raster<f32> = read_geotiff_rows(self.path(var), row, row + 1)?;
        window.get(0, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegclass_core::io::write_geotiff;

    /// Write a full 22-band catalog of constant rasters
    fn write_catalog_dir(dir: &Path, rows: usize, cols: usize) {
        for (i, var) in FeatureVariable::ALL.into_iter().enumerate() {
            let mut band = Raster::filled(rows, cols, i as f32);
            band.set_transform(GeoTransform::new(1000.0, 2000.0, 10.0, -10.0));
            write_geotiff(&band, dir.join(var.file_name())).unwrap();
        }
    }

    #[test]
    fn scans_and_validates_complete_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog_dir(dir.path(), 12, 9);
        // Unrelated files are skipped, not errors
        fs::write(dir.path().join("notes.txt"), "scene metadata").unwrap();

        let catalog = FeatureCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.shape(), (12, 9));
        assert_eq!(catalog.transform().origin_x, 1000.0);

        // Band values follow the canonical order used when writing
        let ndvi = catalog.read_band(FeatureVariable::NDVI).unwrap();
        assert_eq!(ndvi.get(0, 0).unwrap(), 0.0);
        let bg_ndvi = catalog.read_band(FeatureVariable::BackgroundNDVI).unwrap();
        assert_eq!(bg_ndvi.get(11, 8).unwrap(), 21.0);
    }

    #[test]
    fn missing_variable_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog_dir(dir.path(), 4, 4);
        fs::remove_file(dir.path().join("SAVI_07.tif")).unwrap();

        let err = FeatureCatalog::from_dir(dir.path()).unwrap_err();
        match err {
            Error::MissingInput(msg) => assert!(msg.contains("SAVI07"), "{}", msg),
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog_dir(dir.path(), 4, 4);

        let odd = Raster::filled(5, 4, 0.0f32);
        write_geotiff(&odd, dir.path().join("NIR.tif")).unwrap();

        let err = FeatureCatalog::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }

    #[test]
    fn reads_single_pixels() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog_dir(dir.path(), 6, 6);

        let catalog = FeatureCatalog::from_dir(dir.path()).unwrap();
        let v = catalog.read_pixel(FeatureVariable::Pan, 3, 2).unwrap();
        assert_eq!(v, 1.0); // Pan is the second canonical variable

        assert!(catalog.read_pixel(FeatureVariable::Pan, 6, 0).is_err());
        assert!(catalog.read_pixel(FeatureVariable::Pan, 0, 6).is_err());
    }
}
