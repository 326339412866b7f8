//! PNG quicklook rendering for classification rasters

use crate::error::{Error, Result};
use crate::raster::Raster;
use image::{GrayImage, Luma};
use std::path::Path;

/// Write a grayscale PNG preview of a binary classification raster.
///
/// Class 0 renders black, any positive class renders white, so the
/// vegetation mask is inspectable without GIS tooling.
pub fn write_quicklook<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut img = GrayImage::new(cols as u32, rows as u32);
    for ((row, col), &value) in raster.data().indexed_iter() {
        let shade = if value > 0 { 255 } else { 0 };
        img.put_pixel(col as u32, row as u32, Luma([shade]));
    }

    img.save(path.as_ref())
        .map_err(|e| Error::Other(format!("PNG encode error: {}", e)))
}
