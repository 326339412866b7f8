//! Training-sample extraction and the persisted training table

use crate::classify::catalog::FeatureCatalog;
use crate::classify::resolver::FeatureVariable;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::warn;
use vegclass_core::{Error, Result};

/// One labeled training observation: the 22 feature values sampled at a
/// point, plus its binary class (1 = vegetation, 0 = background).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: [f32; FeatureVariable::COUNT],
    pub label: u8,
}

/// Merged positive and negative training samples
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    /// Shuffle sample order with a seeded generator.
    ///
    /// Fitting must not depend on whether vegetation or background points
    /// were extracted first.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.samples.shuffle(&mut rng);
    }

    /// Feature matrix, one row per sample, canonical column order
    pub fn matrix(&self) -> Array2<f32> {
        let mut m = Array2::zeros((self.samples.len(), FeatureVariable::COUNT));
        for (i, sample) in self.samples.iter().enumerate() {
            for (j, &v) in sample.features.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    /// Labels aligned with [`TrainingSet::matrix`] rows
    pub fn labels(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

/// Sample the catalog at pixel points, labeling every kept row.
///
/// Per point, in order:
/// - points outside `[0, rows) x [0, cols)` are skipped,
/// - a failed band read logs a warning and skips the point,
/// - any non-finite feature value discards the whole row.
pub fn extract_samples(
    catalog: &FeatureCatalog,
    points: &[(i64, i64)],
    label: u8,
) -> Vec<TrainingSample> {
    let (rows, cols) = catalog.shape();
    let mut samples = Vec::with_capacity(points.len());

    'points: for &(row, col) in points {
        if row < 0 || col < 0 || row as usize >= rows || col as usize >= cols {
            continue;
        }
        let (row, col) = (row as usize, col as usize);

        let mut features = [0.0f32; FeatureVariable::COUNT];
        for (j, var) in FeatureVariable::ALL.into_iter().enumerate() {
            match catalog.read_pixel(var, row, col) {
                Ok(v) => features[j] = v,
                Err(e) => {
                    warn!("skipping training point ({}, {}): {}", row, col, e);
                    continue 'points;
                }
            }
        }

        if features.iter().any(|v| !v.is_finite()) {
            continue;
        }

        samples.push(TrainingSample { features, label });
    }

    samples
}

/// Extract and merge both point sets.
///
/// Vegetation points are labeled 1, background points 0. Zero valid rows
/// across both sets is fatal; a thin set otherwise still trains.
pub fn build_training_set(
    catalog: &FeatureCatalog,
    vegetation: &[(i64, i64)],
    background: &[(i64, i64)],
) -> Result<TrainingSet> {
    let mut samples = extract_samples(catalog, vegetation, 1);
    samples.extend(extract_samples(catalog, background, 0));

    if samples.is_empty() {
        return Err(Error::NoTrainingData);
    }

    Ok(TrainingSet { samples })
}

/// Persist the training table as CSV.
///
/// Columns are the 22 canonical feature names followed by `Label`.
pub fn write_training_table<P: AsRef<Path>>(set: &TrainingSet, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())
        .map_err(|e| Error::Other(format!("Cannot create training table: {}", e)))?;

    let mut header: Vec<&str> = FeatureVariable::ALL.iter().map(|v| v.name()).collect();
    header.push("Label");
    writer
        .write_record(&header)
        .map_err(|e| Error::Other(format!("Cannot write training table: {}", e)))?;

    for sample in set.samples() {
        let mut record: Vec<String> = sample.features.iter().map(|v| v.to_string()).collect();
        record.push(sample.label.to_string());
        writer
            .write_record(&record)
            .map_err(|e| Error::Other(format!("Cannot write training table: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Other(format!("Cannot write training table: {}", e)))?;
    Ok(())
}
