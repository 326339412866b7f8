//! Geographic training points and map-to-pixel conversion

use crate::error::{Error, Result};
use crate::raster::GeoTransform;
use std::fs;
use std::path::Path;

/// A point in map coordinates (same CRS as the reference raster)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

/// Read a delimited "x y" point file.
///
/// One point per line, whitespace or comma separated. Blank lines and
/// lines starting with `#` are skipped.
pub fn read_point_file<P: AsRef<Path>>(path: P) -> Result<Vec<GeoPoint>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|_| Error::MissingInput(format!("point file {}", path.display())))?;

    let mut points = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(|c: char| c.is_whitespace() || c == ',').filter(|s| !s.is_empty());
        let x = fields.next().and_then(|s| s.parse::<f64>().ok());
        let y = fields.next().and_then(|s| s.parse::<f64>().ok());

        match (x, y) {
            (Some(x), Some(y)) => points.push(GeoPoint { x, y }),
            _ => {
                return Err(Error::Other(format!(
                    "{}: line {}: expected 'x y', got '{}'",
                    path.display(),
                    lineno + 1,
                    line
                )))
            }
        }
    }

    Ok(points)
}

/// Convert map coordinates to integer pixel indices (row, col).
///
/// Fractional pixel coordinates are rounded to the nearest integer;
/// points falling at negative indices are dropped. Points beyond the
/// lower/right edge are kept here and rejected during sampling, where
/// the raster dimensions are known.
pub fn pixel_points(transform: &GeoTransform, points: &[GeoPoint]) -> Vec<(i64, i64)> {
    points
        .iter()
        .filter_map(|p| {
            let (col, row) = transform.geo_to_pixel(p.x, p.y);
            if !col.is_finite() || !row.is_finite() {
                return None;
            }
            let (col, row) = (col.round() as i64, row.round() as i64);
            if row < 0 || col < 0 {
                None
            } else {
                Some((row, col))
            }
        })
        .collect()
}
