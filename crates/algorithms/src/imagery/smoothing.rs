//! Gaussian background bands
//!
//! The classifier pairs every local band with a heavily blurred copy so
//! each pixel carries its neighborhood context. The blur is a separable
//! Gaussian with nearest-edge extension.

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegclass_core::raster::Raster;
use vegclass_core::{Error, Result};

/// Parameters for background smoothing
#[derive(Debug, Clone)]
pub struct BackgroundParams {
    /// Standard deviation in cell units (default 5.0)
    pub sigma: f64,
    /// Kernel extent as a multiple of sigma (default 4.0,
    /// giving a radius of 20 cells at the default sigma)
    pub truncate: f64,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            sigma: 5.0,
            truncate: 4.0,
        }
    }
}

/// Apply large-kernel Gaussian smoothing to a band.
///
/// Separable implementation: one horizontal and one vertical pass with a
/// precomputed 1-D kernel, accumulating in f64. Rows and columns beyond
/// the edge are clamped to the nearest valid index, so edge pixels
/// average over a one-sided neighborhood instead of shrinking to zero.
/// NaN input cells propagate NaN through their kernel footprint.
pub fn gaussian_background(band: &Raster<f32>, params: &BackgroundParams) -> Result<Raster<f32>> {
    if params.sigma <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "sigma",
            value: params.sigma.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if params.truncate <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "truncate",
            value: params.truncate.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let (rows, cols) = band.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let kernel = gaussian_kernel(params.sigma, params.truncate);
    let radius = (kernel.len() / 2) as isize;

    // Horizontal pass
    let data = band.data();
    let horizontal: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_out = vec![0.0f64; cols];
            for col in 0..cols {
                let mut acc = 0.0f64;
                for (k, w) in kernel.iter().enumerate() {
                    let offset = k as isize - radius;
                    let source = (col as isize + offset).clamp(0, cols as isize - 1) as usize;
                    acc += w * data[(row, source)] as f64;
                }
                row_out[col] = acc;
            }
            row_out
        })
        .collect();

    // Vertical pass over the horizontal result
    let output_data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_out = vec![0.0f32; cols];
            for col in 0..cols {
                let mut acc = 0.0f64;
                for (k, w) in kernel.iter().enumerate() {
                    let offset = k as isize - radius;
                    let source = (row as isize + offset).clamp(0, rows as isize - 1) as usize;
                    acc += w * horizontal[source * cols + col];
                }
                row_out[col] = acc as f32;
            }
            row_out
        })
        .collect();

    let mut output = band.with_same_meta::<f32>(rows, cols);
    output.set_nodata(Some(f32::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

/// Normalized 1-D Gaussian kernel of radius `int(truncate * sigma + 0.5)`
fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|d| (-((d * d) as f64) / two_sigma_sq).exp())
        .collect();

    let sum: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}
