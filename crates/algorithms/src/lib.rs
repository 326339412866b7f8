//! # vegclass Algorithms
//!
//! Feature synthesis and supervised classification for 4-band satellite
//! imagery.
//!
//! ## Stages
//!
//! - **imagery**: NDVI, the SAVI family, synthetic panchromatic band,
//!   Gaussian background smoothing, feature-set synthesis to disk
//! - **classify**: band-name resolution, feature catalog, training-sample
//!   extraction, extremely-randomized-trees ensemble, strip-wise
//!   classification, end-to-end pipeline

pub mod classify;
pub mod imagery;
pub mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classify::{
        build_training_set, classify_catalog, classify_scene, fit, partition_rows, resolve,
        ExtraTreesModel, FeatureCatalog, FeatureVariable, ForestParams, PipelineOutputs,
        PipelineParams, RowStrip, TrainingSample, TrainingSet,
    };
    pub use crate::imagery::{
        gaussian_background, ndvi, savi, savi_factor, synthesize_features, synthetic_pan,
        BackgroundParams, SourceBands, SAVI_LEVELS,
    };
    pub use vegclass_core::prelude::*;
}
