//! Strip-wise classification of large scenes
//!
//! Only one strip's worth of feature data is resident at a time, so peak
//! memory is bounded by `strip_rows * cols * 22` floats regardless of
//! scene height. Strips are processed in ascending row order and the
//! result is identical to a single-strip run.

use crate::classify::catalog::FeatureCatalog;
use crate::classify::forest::ExtraTreesModel;
use crate::classify::resolver::FeatureVariable;
use ndarray::Array2;
use vegclass_core::{Raster, Result};

/// Scenes taller than this are split into [`STRIP_COUNT`] strips
pub const STRIP_ROW_THRESHOLD: usize = 3000;

/// Number of strips for tall scenes
pub const STRIP_COUNT: usize = 20;

/// A half-open row range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStrip {
    pub start: usize,
    pub end: usize,
}

impl RowStrip {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Partition `[0, rows)` into disjoint ascending strips.
///
/// Tall scenes get [`STRIP_COUNT`] contiguous strips with the remainder
/// distributed one row each to the earliest strips; short scenes get a
/// single strip.
pub fn partition_rows(rows: usize) -> Vec<RowStrip> {
    if rows == 0 {
        return Vec::new();
    }

    let pieces = if rows > STRIP_ROW_THRESHOLD {
        STRIP_COUNT
    } else {
        1
    };

    let base = rows / pieces;
    let remainder = rows % pieces;

    let mut strips = Vec::with_capacity(pieces);
    let mut start = 0;
    for i in 0..pieces {
        let len = base + usize::from(i < remainder);
        strips.push(RowStrip {
            start,
            end: start + len,
        });
        start += len;
    }
    strips
}

/// Classify every pixel of the catalog's scene.
///
/// Pixels whose feature vector contains any non-finite value are excluded
/// from inference and classified 0; everything else goes through the
/// model. The output inherits the catalog's georeference.
pub fn classify_catalog(catalog: &FeatureCatalog, model: &ExtraTreesModel) -> Result<Raster<u8>> {
    let (rows, _) = catalog.shape();
    classify_strips(catalog, model, &partition_rows(rows))
}

fn classify_strips(
    catalog: &FeatureCatalog,
    model: &ExtraTreesModel,
    strips: &[RowStrip],
) -> Result<Raster<u8>> {
    let (rows, cols) = catalog.shape();
    let mut output: Raster<u8> = Raster::new(rows, cols);
    output.set_transform(*catalog.transform());

    for strip in strips {
        if strip.is_empty() {
            continue;
        }

        let pixels = strip.len() * cols;
        let mut matrix = Array2::<f32>::zeros((pixels, FeatureVariable::COUNT));
        for (j, var) in FeatureVariable::ALL.into_iter().enumerate() {
            let band = catalog.read_rows(var, strip.start, strip.end)?;
            for (i, &v) in band.data().iter().enumerate() {
                matrix[(i, j)] = v;
            }
        }

        // Rows with undefined features stay class 0
        let valid: Vec<usize> = (0..pixels)
            .filter(|&i| matrix.row(i).iter().all(|v| v.is_finite()))
            .collect();

        let mut defined = Array2::<f32>::zeros((valid.len(), FeatureVariable::COUNT));
        for (k, &i) in valid.iter().enumerate() {
            defined.row_mut(k).assign(&matrix.row(i));
        }

        let predictions = model.predict(defined.view())?;
        let out = output.data_mut();
        for (&i, &class) in valid.iter().zip(predictions.iter()) {
            out[(strip.start + i / cols, i % cols)] = class;
        }
    }

    Ok(output)
}
