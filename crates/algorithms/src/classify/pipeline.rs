//! End-to-end classification pipeline
//!
//! Synthesize the feature set, extract the training table, fit the
//! ensemble, classify the scene and write the outputs. The CLI is a thin
//! wrapper over [`classify_scene`]; tests drive it directly.

use crate::classify::catalog::FeatureCatalog;
use crate::classify::forest::{fit, ForestParams};
use crate::classify::strips::classify_catalog;
use crate::classify::training::{build_training_set, write_training_table};
use crate::imagery::{synthesize_features, SourceBands};
use std::path::{Path, PathBuf};
use tracing::info;
use vegclass_core::io::{write_geotiff_u8, write_quicklook};
use vegclass_core::points::{pixel_points, GeoPoint};
use vegclass_core::{Raster, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Number of trees; also seeds the random generator, so a run is
    /// reproducible from its tree count alone
    pub n_trees: usize,
    /// Minimum samples a tree node needs to attempt a split
    pub min_samples_split: usize,
    /// Declared no-data value of the source bands
    pub nodata: Option<f32>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            n_trees: 3,
            min_samples_split: 2,
            nodata: None,
        }
    }
}

/// Artifacts produced by a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    /// Classification GeoTIFF ({0,1}, georeferenced like the Pan band)
    pub classification: PathBuf,
    /// Grayscale PNG quicklook of the classification
    pub quicklook: PathBuf,
    /// Persisted training table (CSV)
    pub training_table: PathBuf,
    /// Number of pixels classified as vegetation
    pub vegetation_pixels: usize,
    /// The classification raster itself
    pub raster: Raster<u8>,
}

/// Run the full pipeline over one scene.
///
/// Training points arrive in map coordinates (same CRS as the imagery)
/// and are converted through the scene's inverse geotransform. All
/// feature rasters, the training table and the classification land in
/// `out_dir`; feature rasters written before a later failure are left in
/// place.
pub fn classify_scene(
    mut bands: SourceBands,
    pan: Option<Raster<f32>>,
    vegetation: &[GeoPoint],
    background: &[GeoPoint],
    out_dir: &Path,
    params: &PipelineParams,
) -> Result<PipelineOutputs> {
    if let Some(nd) = params.nodata {
        bands.set_nodata(nd);
    }

    info!("synthesizing feature rasters in {}", out_dir.display());
    let catalog = synthesize_features(&bands, pan.as_ref(), out_dir)?;

    let transform = *catalog.transform();
    let veg_px = pixel_points(&transform, vegetation);
    let bg_px = pixel_points(&transform, background);
    info!(
        "training points inside frame: {} vegetation, {} background",
        veg_px.len(),
        bg_px.len()
    );

    let mut set = build_training_set(&catalog, &veg_px, &bg_px)?;
    let training_table = out_dir.join("TrainingPoints.csv");
    write_training_table(&set, &training_table)?;

    let seed = params.n_trees as u64;
    set.shuffle(seed);
    let model = fit(
        &set,
        &ForestParams {
            n_trees: params.n_trees,
            seed,
            min_samples_split: params.min_samples_split,
        },
    )?;
    info!("fitted {} trees on {} samples", model.n_trees(), set.len());

    let classification = classify_catalog(&catalog, &model)?;
    let vegetation_pixels = classification.data().iter().filter(|&&c| c > 0).count();
    info!(
        "classified {} pixels, {} vegetation",
        classification.len(),
        vegetation_pixels
    );

    let tif_path = out_dir.join("vegetation_forest_classification.tif");
    let png_path = out_dir.join("vegetation_forest_classification.png");
    write_geotiff_u8(&classification, &tif_path)?;
    write_quicklook(&classification, &png_path)?;

    Ok(PipelineOutputs {
        classification: tif_path,
        quicklook: png_path,
        training_table,
        vegetation_pixels,
        raster: classification,
    })
}
