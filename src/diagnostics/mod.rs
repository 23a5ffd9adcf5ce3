//! Diagnostics data model exposed by the detector and the demo binary.
//!
//! [`DetectionReport`] is the entry point: the refined candidates with their
//! scores, the filter/merge survivors, and a [`PipelineTrace`] describing every
//! stage the last run executed.

pub mod filter;
pub mod hypotheses;
pub mod merge;
pub mod pipeline;
pub mod refine;
pub mod timing;

pub use filter::FilterStage;
pub use hypotheses::HypothesisStage;
pub use merge::MergeStage;
pub use pipeline::{DetectionReport, InputDescriptor, PipelineTrace, SymmetryDescriptor};
pub use refine::{RefinementSample, RefinementStage};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
