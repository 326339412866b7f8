//! I/O operations for reading and writing geospatial data

mod native;
mod quicklook;

pub use native::{
    read_geotiff, read_geotiff_meta, read_geotiff_rows, write_geotiff, write_geotiff_u8,
    RasterMeta,
};
pub use quicklook::write_quicklook;
