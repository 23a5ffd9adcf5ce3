//! Symmetry detector orchestrating the multi-stage pipeline.
//!
//! Overview
//! - Downsamples the input cloud on a voxel grid (optional).
//! - Seeds candidate planes through the cloud centroid from its principal
//!   axes, or takes caller-supplied candidates.
//! - Refines every candidate against reflected nearest-neighbour
//!   correspondences.
//! - Scores candidates for occlusion, cloud support and correspondence
//!   quality, filters them on thresholds and merges duplicates.
//!
//! Modules
//! - [`params`] – configuration shared by every stage.
//! - `pipeline` – the [`SymmetryDetector`] state machine.
//! - `error` – [`DetectError`].
//!
//! Normals of planes and of sensor points carry no sign: every angular
//! comparison treats antipodal directions as equal.

mod error;
pub mod params;
mod pipeline;

pub use error::DetectError;
pub use params::{
    CorrespondenceParams, DetectionParams, FilterParams, MergeParams, ScoringParams,
};
pub use pipeline::{DetectorState, SymmetryDetector, MIN_INPUT_POINTS};
