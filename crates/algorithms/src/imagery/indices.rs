//! Spectral vegetation indices and the synthetic panchromatic band
//!
//! All functions operate on single-band `f32` rasters (one band per
//! raster) and produce a new raster carrying the input's geotransform.

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegclass_core::raster::Raster;
use vegclass_core::{Error, Result};

/// Number of soil-adjustment levels in the SAVI family
pub const SAVI_LEVELS: usize = 10;

/// Soil-brightness correction factor for a 1-based SAVI level.
///
/// Level 1 is L = 0.1, level 10 is L = 1.0.
pub fn savi_factor(level: usize) -> f32 {
    debug_assert!((1..=SAVI_LEVELS).contains(&level));
    level as f32 / 10.0
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Undefined pixels (no-data input, zero denominator) are set to the
/// sentinel value -1.0, the bottom of the index range, so the band is
/// total over the grid and never poisons downstream feature vectors.
pub fn ndvi(nir: &Raster<f32>, red: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(nir, red)?;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![-1.0f32; cols];
            for col in 0..cols {
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if is_nodata_f32(n, nodata_nir) || is_nodata_f32(r, nodata_red) {
                    continue;
                }

                let value = (n - r) / (n + r);
                if value.is_finite() {
                    row_data[col] = value;
                }
            }
            row_data
        })
        .collect();

    build_output(nir, rows, cols, data)
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (NIR + Red + L)) * (1 + L)`
///
/// Unlike [`ndvi`], undefined pixels stay NaN; the training extractor
/// and the strip engine both treat NaN feature vectors as invalid.
pub fn savi(nir: &Raster<f32>, red: &Raster<f32>, l: f32) -> Result<Raster<f32>> {
    check_dimensions(nir, red)?;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f32::NAN; cols];
            for col in 0..cols {
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if is_nodata_f32(n, nodata_nir) || is_nodata_f32(r, nodata_red) {
                    continue;
                }

                let denom = n + r + l;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = ((n - r) / denom) * (1.0 + l);
            }
            row_data
        })
        .collect();

    build_output(nir, rows, cols, data)
}

/// Synthetic panchromatic band: mean of the four source bands.
///
/// Used when the scene ships without a real panchromatic image.
pub fn synthetic_pan(
    red: &Raster<f32>,
    green: &Raster<f32>,
    blue: &Raster<f32>,
    nir: &Raster<f32>,
) -> Result<Raster<f32>> {
    check_dimensions(red, green)?;
    check_dimensions(red, blue)?;
    check_dimensions(red, nir)?;

    let (rows, cols) = red.shape();
    let nd_red = red.nodata();
    let nd_green = green.nodata();
    let nd_blue = blue.nodata();
    let nd_nir = nir.nodata();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f32::NAN; cols];
            for col in 0..cols {
                let r = unsafe { red.get_unchecked(row, col) };
                let g = unsafe { green.get_unchecked(row, col) };
                let b = unsafe { blue.get_unchecked(row, col) };
                let n = unsafe { nir.get_unchecked(row, col) };

                if is_nodata_f32(r, nd_red)
                    || is_nodata_f32(g, nd_green)
                    || is_nodata_f32(b, nd_blue)
                    || is_nodata_f32(n, nd_nir)
                {
                    continue;
                }

                row_data[col] = (r + g + b + n) / 4.0;
            }
            row_data
        })
        .collect();

    build_output(red, rows, cols, data)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_nodata_f32(value: f32, nodata: Option<f32>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f32::EPSILON,
        None => false,
    }
}

pub(crate) fn check_dimensions(a: &Raster<f32>, b: &Raster<f32>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f32>,
    rows: usize,
    cols: usize,
    data: Vec<f32>,
) -> Result<Raster<f32>> {
    let mut output = template.with_same_meta::<f32>(rows, cols);
    output.set_nodata(Some(f32::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vegclass_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    fn band_from(values: &[&[f32]]) -> Raster<f32> {
        let rows = values.len();
        let cols = values[0].len();
        let flat: Vec<f32> = values.iter().flat_map(|r| r.iter().copied()).collect();
        let mut r = Raster::from_vec(flat, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_ndvi() {
        let nir = make_band(5, 5, 50.0);
        let red = make_band(5, 5, 10.0);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        // (50 - 10) / (50 + 10) = 0.6667
        assert_relative_eq!(val, 40.0 / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ndvi_zero_denominator_sentinel() {
        let nir = make_band(3, 3, 0.0);
        let red = make_band(3, 3, 0.0);

        let result = ndvi(&nir, &red).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(result.get(row, col).unwrap(), -1.0);
            }
        }
    }

    #[test]
    fn test_ndvi_nodata_sentinel() {
        let mut nir = make_band(5, 5, 50.0);
        nir.set_nodata(Some(-9999.0));
        nir.set(2, 2, -9999.0).unwrap();
        let red = make_band(5, 5, 10.0);

        let result = ndvi(&nir, &red).unwrap();
        assert_eq!(result.get(2, 2).unwrap(), -1.0);
        assert!(result.get(0, 0).unwrap() > 0.0);
    }

    #[test]
    fn test_savi_hand_computed_patch() {
        let nir = band_from(&[&[50.0, 60.0], &[40.0, 30.0]]);
        let red = band_from(&[&[10.0, 20.0], &[5.0, 15.0]]);

        let result = savi(&nir, &red, 0.5).unwrap();

        // ((NIR - R) / (NIR + R + 0.5)) * 1.5
        assert_relative_eq!(result.get(0, 0).unwrap(), 40.0 / 60.5 * 1.5, epsilon = 1e-5);
        assert_relative_eq!(result.get(0, 1).unwrap(), 40.0 / 80.5 * 1.5, epsilon = 1e-5);
        assert_relative_eq!(result.get(1, 0).unwrap(), 35.0 / 45.5 * 1.5, epsilon = 1e-5);
        assert_relative_eq!(result.get(1, 1).unwrap(), 15.0 / 45.5 * 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_savi_all_levels_match_formula() {
        let nir = band_from(&[&[50.0, 60.0], &[40.0, 30.0]]);
        let red = band_from(&[&[10.0, 20.0], &[5.0, 15.0]]);

        for level in 1..=SAVI_LEVELS {
            let l = savi_factor(level);
            let result = savi(&nir, &red, l).unwrap();
            for row in 0..2 {
                for col in 0..2 {
                    let n = nir.get(row, col).unwrap();
                    let r = red.get(row, col).unwrap();
                    let expected = ((n - r) / (n + r + l)) * (1.0 + l);
                    assert_relative_eq!(result.get(row, col).unwrap(), expected, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_savi_zero_denominator_is_nan() {
        let nir = make_band(2, 2, 1.0);
        let red = make_band(2, 2, -1.5);

        // denom = 1.0 - 1.5 + 0.5 = 0
        let result = savi(&nir, &red, 0.5).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_synthetic_pan_is_band_mean() {
        let red = make_band(4, 4, 10.0);
        let green = make_band(4, 4, 20.0);
        let blue = make_band(4, 4, 30.0);
        let nir = make_band(4, 4, 60.0);

        let result = synthetic_pan(&red, &green, &blue, &nir).unwrap();
        assert_relative_eq!(result.get(1, 1).unwrap(), 30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        assert!(ndvi(&a, &b).is_err());
        assert!(savi(&a, &b, 0.1).is_err());
    }

    #[test]
    fn test_savi_factor_steps() {
        assert_relative_eq!(savi_factor(1), 0.1);
        assert_relative_eq!(savi_factor(10), 1.0);
    }
}
