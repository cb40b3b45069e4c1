//! Synthetic hazed-scene dataset generation.
//!
//! Parses a voxel density field, places non-overlapping cylindrical buildings
//! by rejection sampling, assembles the scene through a pluggable
//! [`backend::SceneBackend`], and drives per-camera RGB and depth outputs
//! with paired text labels.
pub mod backend;
pub mod camera;
pub mod constants;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod placement;
pub mod scene;

pub use backend::{ManifestBackend, SceneBackend};
pub use error::{PipelineError, Result};
pub use grid::DensityGrid;
pub use pipeline::{PipelineConfig, SceneMode, ScenePipeline};
pub use placement::{Footprint, PlacementConfig, sample_footprints};
