#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod cloud;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod io;
pub mod occupancy;
pub mod symmetry;
pub mod synthetic;

// Pipeline stages – public for tools and tests, considered internals.
pub mod angle;
pub mod downsample;
pub mod filter;
pub mod hypothesis;
pub mod merge;
pub mod refine;
pub mod score;
pub mod spatial;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector, inputs and results.
pub use crate::cloud::{PointCloud, PointNormal};
pub use crate::detector::{DetectError, DetectionParams, DetectorState, SymmetryDetector};
pub use crate::occupancy::{CellState, OccupancyQuery};
pub use crate::symmetry::ReflectionalSymmetry;

// High-level diagnostics returned by the detector.
pub use crate::diagnostics::{DetectionReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use symmetry_detector::prelude::*;
/// use nalgebra::{Point3, Vector3};
///
/// # fn main() -> Result<(), DetectError> {
/// let cloud = symmetry_detector::synthetic::box_surface(
///     Point3::origin(),
///     Vector3::new(0.15, 0.1, 0.05),
///     0.01,
/// );
/// let occupancy = UniformOccupancy(CellState::Free);
///
/// let mut det = SymmetryDetector::new(DetectionParams::default());
/// det.set_input_cloud(&cloud);
/// det.set_input_occupancy_map(&occupancy);
/// det.detect()?;
/// det.filter()?;
/// let merged = det.merge()?.to_vec();
/// println!("symmetries={}", merged.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::occupancy::UniformOccupancy;
    pub use crate::{
        CellState, DetectError, DetectionParams, PointCloud, ReflectionalSymmetry,
        SymmetryDetector,
    };
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::filter::filter_symmetries;
    pub use crate::hypothesis::{generate_hypotheses, initial_hypotheses};
    pub use crate::merge::{merge_duplicate_symmetries, merge_duplicate_symmetries_subset};
    pub use crate::refine::{refine_symmetries, refine_symmetry, CorrespondenceSearch};
    pub use crate::score::{score_symmetries, SymmetryScorer};

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        FilterStage, HypothesisStage, InputDescriptor, MergeStage, RefinementSample,
        RefinementStage, StageTiming, SymmetryDescriptor, TimingBreakdown,
    };
}
