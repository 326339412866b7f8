//! Supervised vegetation classification
//!
//! The classification stack, bottom to top:
//! - **resolver**: file name → feature variable
//! - **catalog**: validated set of the 22 co-registered feature rasters
//! - **training**: point sampling and the persisted training table
//! - **forest**: extremely-randomized-trees ensemble
//! - **strips**: bounded-memory strip-wise inference
//! - **pipeline**: end-to-end orchestration

mod catalog;
mod forest;
mod pipeline;
mod resolver;
mod strips;
mod training;

pub use catalog::FeatureCatalog;
pub use forest::{fit, ExtraTreesModel, ForestParams};
pub use pipeline::{classify_scene, PipelineOutputs, PipelineParams};
pub use resolver::{resolve, FeatureVariable};
pub use strips::{classify_catalog, partition_rows, RowStrip};
pub use training::{
    build_training_set, extract_samples, write_training_table, TrainingSample, TrainingSet,
};
