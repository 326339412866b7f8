//! Feature-set synthesis
//!
//! Turns the four source bands into the full 22-raster feature set on
//! disk: the persisted sources, NDVI, the ten SAVI levels, the (real or
//! synthetic) panchromatic band and the six Gaussian background bands.
//! Existing files are overwritten.

use crate::classify::{FeatureCatalog, FeatureVariable};
use crate::imagery::indices::{check_dimensions, ndvi, savi, savi_factor, synthetic_pan, SAVI_LEVELS};
use crate::imagery::smoothing::{gaussian_background, BackgroundParams};
use std::fs;
use std::path::Path;
use tracing::debug;
use vegclass_core::io::write_geotiff;
use vegclass_core::{Raster, Result};

/// The four co-registered source bands of a scene
#[derive(Debug, Clone)]
pub struct SourceBands {
    pub red: Raster<f32>,
    pub green: Raster<f32>,
    pub blue: Raster<f32>,
    pub nir: Raster<f32>,
}

impl SourceBands {
    /// Check that all four bands share one grid
    pub fn validate(&self) -> Result<()> {
        check_dimensions(&self.red, &self.green)?;
        check_dimensions(&self.red, &self.blue)?;
        check_dimensions(&self.red, &self.nir)?;
        Ok(())
    }

    /// Declare a no-data value on all four bands
    pub fn set_nodata(&mut self, nodata: f32) {
        self.red.set_nodata(Some(nodata));
        self.green.set_nodata(Some(nodata));
        self.blue.set_nodata(Some(nodata));
        self.nir.set_nodata(Some(nodata));
    }
}

/// Write the complete feature set into `out_dir` and return its catalog.
///
/// When `pan` is `None` the panchromatic band is synthesized as the mean
/// of the four source bands. All rasters are single-band float32 GeoTIFFs
/// inheriting the red band's georeference, named so a directory scan
/// resolves every [`FeatureVariable`].
pub fn synthesize_features(
    bands: &SourceBands,
    pan: Option<&Raster<f32>>,
    out_dir: &Path,
) -> Result<FeatureCatalog> {
    bands.validate()?;
    if let Some(p) = pan {
        check_dimensions(&bands.red, p)?;
    }
    fs::create_dir_all(out_dir)?;

    let write = |var: FeatureVariable, raster: &Raster<f32>| -> Result<()> {
        let path = out_dir.join(var.file_name());
        write_geotiff(raster, &path)?;
        debug!("wrote {}", path.display());
        Ok(())
    };

    write(FeatureVariable::R, &bands.red)?;
    write(FeatureVariable::G, &bands.green)?;
    write(FeatureVariable::B, &bands.blue)?;
    write(FeatureVariable::NIR, &bands.nir)?;

    let ndvi_band = ndvi(&bands.nir, &bands.red)?;
    write(FeatureVariable::NDVI, &ndvi_band)?;

    for level in 1..=SAVI_LEVELS {
        let savi_band = savi(&bands.nir, &bands.red, savi_factor(level))?;
        write(savi_variable(level), &savi_band)?;
    }

    let pan_band = match pan {
        Some(p) => p.clone(),
        None => synthetic_pan(&bands.red, &bands.green, &bands.blue, &bands.nir)?,
    };
    write(FeatureVariable::Pan, &pan_band)?;

    let params = BackgroundParams::default();
    let backgrounds = [
        (FeatureVariable::BackgroundRed, &bands.red),
        (FeatureVariable::BackgroundGreen, &bands.green),
        (FeatureVariable::BackgroundBlue, &bands.blue),
        (FeatureVariable::BackgroundNIR, &bands.nir),
        (FeatureVariable::BackgroundPan, &pan_band),
        (FeatureVariable::BackgroundNDVI, &ndvi_band),
    ];
    for (var, band) in backgrounds {
        let smoothed = gaussian_background(band, &params)?;
        write(var, &smoothed)?;
    }

    FeatureCatalog::from_dir(out_dir)
}

fn savi_variable(level: usize) -> FeatureVariable {
    match level {
        1 => FeatureVariable::SAVI01,
        2 => FeatureVariable::SAVI02,
        3 => FeatureVariable::SAVI03,
        4 => FeatureVariable::SAVI04,
        5 => FeatureVariable::SAVI05,
        6 => FeatureVariable::SAVI06,
        7 => FeatureVariable::SAVI07,
        8 => FeatureVariable::SAVI08,
        9 => FeatureVariable::SAVI09,
        _ => FeatureVariable::SAVI10,
    }
}
