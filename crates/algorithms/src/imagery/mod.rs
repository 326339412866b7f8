//! Spectral feature derivation
//!
//! Derives the per-pixel feature bands the classifier consumes:
//! - NDVI and the ten-step SAVI family
//! - Synthetic panchromatic band (mean of R, G, B, NIR)
//! - Gaussian "background" bands (large-kernel low-pass context)
//! - Feature-set synthesis: writes all 22 bands as float32 GeoTIFFs

mod indices;
mod smoothing;
mod synthesis;

pub use indices::{ndvi, savi, savi_factor, synthetic_pan, SAVI_LEVELS};
pub use smoothing::{gaussian_background, BackgroundParams};
pub use synthesis::{synthesize_features, SourceBands};
