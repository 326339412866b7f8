//! # vegclass Core
//!
//! Core types and I/O for the vegclass vegetation classifier.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `GeoTransform`: Affine transformation for georeferencing
//! - Native GeoTIFF I/O, including bounded-memory row-window reads
//! - PNG quicklook rendering for classification outputs
//! - Training point parsing and map-to-pixel conversion

pub mod error;
pub mod io;
pub mod points;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::points::GeoPoint;
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
