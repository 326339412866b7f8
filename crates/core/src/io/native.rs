//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate directly; georeferencing travels through the
//! ModelPixelScale/ModelTiepoint tags. Feature bands are written as 32-bit
//! float, classification outputs as 8-bit unsigned.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// Dimensions and georeferencing of a raster file, read without decoding
/// the pixel data.
#[derive(Debug, Clone)]
pub struct RasterMeta {
    pub rows: usize,
    pub cols: usize,
    pub transform: Option<GeoTransform>,
}

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;
    let data: Vec<T> = convert_decoded(result)?;

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

/// Read rows `[start, end)` of a GeoTIFF into a Raster.
///
/// Only the strips overlapping the requested window are decoded, so memory
/// use is bounded by the window size plus one strip. The returned raster's
/// geotransform is shifted so its row 0 georeferences to `start`.
pub fn read_geotiff_rows<T, P>(path: P, start: usize, end: usize) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    if start >= end || end > rows {
        return Err(Error::InvalidParameter {
            name: "row_window",
            value: format!("{}..{}", start, end),
            reason: format!("must be a non-empty range within 0..{}", rows),
        });
    }

    let (chunk_cols, chunk_rows) = decoder.chunk_dimensions();
    if chunk_cols as usize != cols {
        // Tiled layout; our own writer always emits strips.
        return Err(Error::UnsupportedDataType(
            "tiled TIFF layout (stripped expected)".to_string(),
        ));
    }
    let chunk_rows = chunk_rows as usize;

    let mut data: Vec<T> = Vec::with_capacity((end - start) * cols);
    let first_chunk = start / chunk_rows;
    let last_chunk = (end - 1) / chunk_rows;

    for chunk in first_chunk..=last_chunk {
        let result = decoder
            .read_chunk(chunk as u32)
            .map_err(|e| Error::Other(format!("Cannot read strip {}: {}", chunk, e)))?;
        let buf: Vec<T> = convert_decoded(result)?;

        let chunk_start = chunk * chunk_rows;
        let rows_in_chunk = buf.len() / cols;
        if rows_in_chunk * cols != buf.len() {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows_in_chunk,
            });
        }

        let copy_from = start.max(chunk_start) - chunk_start;
        let copy_to = end.min(chunk_start + rows_in_chunk) - chunk_start;
        data.extend_from_slice(&buf[copy_from * cols..copy_to * cols]);
    }

    let mut raster = Raster::from_vec(data, end - start, cols)?;
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform.shifted_rows(start));
    }

    Ok(raster)
}

/// Read dimensions and geotransform without decoding pixel data
pub fn read_geotiff_meta<P: AsRef<Path>>(path: P) -> Result<RasterMeta> {
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    Ok(RasterMeta {
        rows: height as usize,
        cols: width as usize,
        transform: read_geotransform(&mut decoder).ok(),
    })
}

/// Convert a decoded TIFF buffer to the requested element type
fn convert_decoded<T: RasterElement>(result: DecodingResult) -> Result<Vec<T>> {
    fn cast_all<S: Copy, T: RasterElement>(buf: Vec<S>) -> Vec<T>
    where
        S: num_traits::NumCast,
    {
        buf.iter()
            .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
            .collect()
    }

    match result {
        DecodingResult::F32(buf) => Ok(cast_all(buf)),
        DecodingResult::F64(buf) => Ok(cast_all(buf)),
        DecodingResult::U8(buf) => Ok(cast_all(buf)),
        DecodingResult::U16(buf) => Ok(cast_all(buf)),
        DecodingResult::U32(buf) => Ok(cast_all(buf)),
        DecodingResult::I8(buf) => Ok(cast_all(buf)),
        DecodingResult::I16(buf) => Ok(cast_all(buf)),
        DecodingResult::I32(buf) => Ok(cast_all(buf)),
        _ => Err(Error::UnsupportedDataType(
            "Unsupported TIFF pixel format".to_string(),
        )),
    }
}

/// Attempt to read GeoTransform from TIFF tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        let pixel_width = scale[0];
        let pixel_height = -scale[1]; // Negative for north-up

        return Ok(GeoTransform::new(origin_x, origin_y, pixel_width, pixel_height));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    write_geo_tags(image.encoder(), raster.transform())?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Write a classification raster to a GeoTIFF file as 8-bit unsigned.
///
/// Values round-trip exactly through `read_geotiff::<u8, _>`.
pub fn write_geotiff_u8<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<u8> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray8>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    write_geo_tags(image.encoder(), raster.transform())?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Write ModelPixelScale, ModelTiepoint and a minimal GeoKey directory
fn write_geo_tags<W, K>(
    encoder: &mut tiff::encoder::DirectoryEncoder<W, K>,
    gt: &GeoTransform,
) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
    K: tiff::encoder::TiffKind,
{
    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    encoder
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    encoder
        .write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // GeoKeyDirectoryTag (34735): GTModelTypeGeoKey=1 (Projected),
    // GTRasterTypeGeoKey=1 (RasterPixelIsArea).
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2, // Version 1.1.0, 2 keys
        1024, 0, 1, 1,
        1025, 0, 1, 1,
    ];
    encoder
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    Ok(())
}
