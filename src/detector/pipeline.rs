//! Detection orchestrator driving the symmetry pipeline end-to-end.
//!
//! The [`SymmetryDetector`] borrows an input cloud and an occupancy map,
//! then runs downsample → hypotheses → refinement → scoring on `detect()`.
//! `filter()` and `merge()` are optional follow-up stages over the detected
//! candidates.
//!
//! Typical usage:
//! ```no_run
//! use symmetry_detector::occupancy::{CellState, UniformOccupancy};
//! use symmetry_detector::{DetectionParams, PointCloud, SymmetryDetector};
//!
//! # fn example(cloud: PointCloud) -> Result<(), symmetry_detector::DetectError> {
//! let occupancy = UniformOccupancy(CellState::Free);
//! let mut detector = SymmetryDetector::new(DetectionParams::default());
//! detector.set_input_cloud(&cloud);
//! detector.set_input_occupancy_map(&occupancy);
//! detector.detect()?;
//! detector.filter()?;
//! let merged = detector.merge()?.to_vec();
//! for id in merged {
//!     println!("{:?}", detector.symmetries()[id]);
//! }
//! # Ok(())
//! # }
//! ```
use super::error::DetectError;
use super::params::DetectionParams;
use crate::cloud::{centroid_of, PointCloud};
use crate::diagnostics::{
    elapsed_ms, DetectionReport, FilterStage, HypothesisStage, InputDescriptor, MergeStage,
    PipelineTrace, RefinementSample, RefinementStage, SymmetryDescriptor,
};
use crate::downsample::{Downsampler, VoxelGridDownsampler};
use crate::filter::filter_symmetries;
use crate::hypothesis::initial_hypotheses;
use crate::merge::merge_duplicate_symmetries_subset;
use crate::occupancy::OccupancyQuery;
use crate::refine::{refine_symmetries, CorrespondenceSearch, PointMatch, RefineOutcome, RefinedSymmetry};
use crate::score::{score_symmetries, PointScores, SymmetryScorer, SymmetryScores};
use crate::symmetry::ReflectionalSymmetry;
use log::debug;
use nalgebra::Point3;
use std::time::Instant;

/// Points needed in the input (and downsampled) cloud for `detect()`.
pub const MIN_INPUT_POINTS: usize = 2;

/// Lifecycle of a [`SymmetryDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DetectorState {
    /// Cloud or occupancy map missing.
    Uninitialized,
    /// Inputs set, no valid results.
    Configured,
    Detected,
    Filtered,
    Merged,
}

/// Everything produced by one successful `detect()` plus later stages.
#[derive(Default)]
struct RunState {
    input_points: usize,
    downsampled: PointCloud,
    refined: Vec<RefinedSymmetry>,
    symmetries: Vec<ReflectionalSymmetry>,
    scores: Vec<SymmetryScores>,
    reference_points: Vec<Point3<f32>>,
    filtered: Option<Vec<usize>>,
    merged: Option<Vec<usize>>,
    trace: PipelineTrace,
}

/// Reflectional symmetry detector over a borrowed cloud and occupancy map.
pub struct SymmetryDetector<'a> {
    params: DetectionParams,
    cloud: Option<&'a PointCloud>,
    occupancy: Option<&'a dyn OccupancyQuery>,
    initial_symmetries: Option<Vec<ReflectionalSymmetry>>,
    downsampler: Box<dyn Downsampler>,
    run: RunState,
    state: DetectorState,
}

impl Default for SymmetryDetector<'_> {
    fn default() -> Self {
        Self::new(DetectionParams::default())
    }
}

impl<'a> SymmetryDetector<'a> {
    /// Create a detector with the supplied parameters and no inputs.
    pub fn new(params: DetectionParams) -> Self {
        Self {
            params,
            cloud: None,
            occupancy: None,
            initial_symmetries: None,
            downsampler: Box::new(VoxelGridDownsampler),
            run: RunState::default(),
            state: DetectorState::Uninitialized,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Set the cloud to analyse. Discards all results and initial symmetries.
    pub fn set_input_cloud(&mut self, cloud: &'a PointCloud) {
        self.cloud = Some(cloud);
        self.initial_symmetries = None;
        self.invalidate();
    }

    pub fn set_input_occupancy_map(&mut self, occupancy: &'a dyn OccupancyQuery) {
        self.occupancy = Some(occupancy);
        self.invalidate();
    }

    /// Candidates to refine instead of generated hypotheses. An empty list
    /// restores generation.
    pub fn set_input_symmetries(&mut self, symmetries: Vec<ReflectionalSymmetry>) {
        self.initial_symmetries = if symmetries.is_empty() {
            None
        } else {
            Some(symmetries)
        };
        self.invalidate();
    }

    pub fn set_parameters(&mut self, params: DetectionParams) {
        self.params = params;
        self.invalidate();
    }

    pub fn set_downsampler(&mut self, downsampler: Box<dyn Downsampler>) {
        self.downsampler = downsampler;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.run = RunState::default();
        self.state = if self.cloud.is_some() && self.occupancy.is_some() {
            DetectorState::Configured
        } else {
            DetectorState::Uninitialized
        };
    }

    fn require_detected(&self, operation: &'static str) -> Result<(), DetectError> {
        if self.state >= DetectorState::Detected {
            Ok(())
        } else {
            Err(DetectError::NotDetected { operation })
        }
    }

    /// Run downsampling, hypothesis generation, refinement and scoring.
    ///
    /// Returns the number of refined candidates. On error the detector holds
    /// no candidates.
    pub fn detect(&mut self) -> Result<usize, DetectError> {
        self.invalidate();
        let cloud = self.cloud.ok_or(DetectError::MissingInputCloud)?;
        let occupancy = self.occupancy.ok_or(DetectError::MissingOccupancyMap)?;
        if cloud.len() < MIN_INPUT_POINTS {
            return Err(DetectError::InsufficientPoints {
                found: cloud.len(),
                required: MIN_INPUT_POINTS,
            });
        }
        let params = &self.params;
        debug!(
            "SymmetryDetector::detect start points={} voxel={} provided={}",
            cloud.len(),
            params.voxel_size,
            self.initial_symmetries.as_ref().map_or(0, Vec::len)
        );
        let mut trace = PipelineTrace::default();

        let ds_start = Instant::now();
        let downsampled = self.downsampler.downsample(cloud, params.voxel_size);
        let ds_ms = elapsed_ms(ds_start);
        trace.timings.record("downsample", ds_ms);
        trace.downsample_ms = Some(ds_ms);
        debug!(
            "SymmetryDetector::detect downsample {} -> {} points",
            cloud.len(),
            downsampled.len()
        );
        if downsampled.len() < MIN_INPUT_POINTS {
            return Err(DetectError::InsufficientPoints {
                found: downsampled.len(),
                required: MIN_INPUT_POINTS,
            });
        }

        let hyp_start = Instant::now();
        let hypotheses = initial_hypotheses(
            self.initial_symmetries.as_deref(),
            &cloud.positions(),
            params.num_angle_divisions,
            params.flatness_threshold,
        );
        let hyp_ms = elapsed_ms(hyp_start);
        trace.timings.record("hypotheses", hyp_ms);
        trace.hypotheses = Some(HypothesisStage {
            elapsed_ms: hyp_ms,
            source: hypotheses.source,
            count: hypotheses.symmetries.len(),
        });
        debug!(
            "SymmetryDetector::detect hypotheses source={:?} count={}",
            hypotheses.source,
            hypotheses.symmetries.len()
        );
        if hypotheses.symmetries.is_empty() {
            return Err(DetectError::NoHypotheses);
        }

        let positions = downsampled.positions();
        let (refined, scores, reference_points) = {
            let refine_start = Instant::now();
            let search =
                CorrespondenceSearch::new(&downsampled.points, &positions, params.correspondence_params());
            let refined = refine_symmetries(&search, &hypotheses.symmetries, params.refine_iterations);
            let refine_ms = elapsed_ms(refine_start);
            trace.timings.record("refinement", refine_ms);
            let refinement_stage = RefinementStage {
                elapsed_ms: refine_ms,
                candidates: refined
                    .iter()
                    .map(|r| RefinementSample {
                        iterations: r.iterations,
                        outcome: r.outcome,
                        correspondences: r.accepted_count(),
                    })
                    .collect(),
            };
            debug!(
                "SymmetryDetector::detect refinement converged={} max_iterations={} degenerate={}",
                refinement_stage.count(RefineOutcome::Converged),
                refinement_stage.count(RefineOutcome::MaxIterations),
                refinement_stage.count(RefineOutcome::Degenerate)
            );
            trace.refinement = Some(refinement_stage);

            let score_start = Instant::now();
            let scorer =
                SymmetryScorer::new(&downsampled.points, &positions, occupancy, params.scoring_params());
            let scores = score_symmetries(&scorer, &refined);
            let score_ms = elapsed_ms(score_start);
            trace.timings.record("scoring", score_ms);
            trace.scoring_ms = Some(score_ms);

            let reference_points: Vec<Point3<f32>> = refined
                .iter()
                .map(|r| reference_point(r, &positions, search.centroid()))
                .collect();
            (refined, scores, reference_points)
        };
        let symmetries: Vec<ReflectionalSymmetry> = refined.iter().map(|r| r.symmetry).collect();
        debug!(
            "SymmetryDetector::detect done candidates={} elapsed_ms={:.3}",
            symmetries.len(),
            trace.timings.total_ms
        );

        let count = symmetries.len();
        self.run = RunState {
            input_points: cloud.len(),
            downsampled,
            refined,
            symmetries,
            scores,
            reference_points,
            filtered: None,
            merged: None,
            trace,
        };
        self.state = DetectorState::Detected;
        Ok(count)
    }

    /// Keep the candidates passing the score thresholds. Clears any merge
    /// result.
    pub fn filter(&mut self) -> Result<&[usize], DetectError> {
        self.require_detected("filter")?;
        let start = Instant::now();
        let (kept, diagnostics) = filter_symmetries(&self.run.scores, &self.params.filter_params());
        let ms = elapsed_ms(start);
        debug!(
            "SymmetryDetector::filter kept={} rejected occlusion={} cloud={} correspondence={}",
            diagnostics.kept,
            diagnostics.rejected_occlusion,
            diagnostics.rejected_cloud_inlier,
            diagnostics.rejected_correspondence_inlier
        );
        let trace = &mut self.run.trace;
        trace.timings.truncate_after("scoring");
        trace.timings.record("filter", ms);
        trace.filter = Some(FilterStage {
            elapsed_ms: ms,
            diagnostics,
        });
        trace.merge = None;
        self.run.merged = None;
        self.state = DetectorState::Filtered;
        Ok(self.run.filtered.insert(kept).as_slice())
    }

    /// Collapse duplicate candidates among the filtered ids, or among all
    /// candidates when `filter()` has not run.
    pub fn merge(&mut self) -> Result<&[usize], DetectError> {
        self.require_detected("merge")?;
        let all: Vec<usize>;
        let ids: &[usize] = match &self.run.filtered {
            Some(ids) => ids,
            None => {
                all = (0..self.run.symmetries.len()).collect();
                &all
            }
        };
        let merge_params = self.params.merge_params();
        let start = Instant::now();
        let outcome = merge_duplicate_symmetries_subset(
            &self.run.symmetries,
            &self.run.reference_points,
            ids,
            &merge_params,
        );
        let ms = elapsed_ms(start);
        debug!(
            "SymmetryDetector::merge input={} kept={}",
            ids.len(),
            outcome.kept.len()
        );
        let stage = MergeStage {
            elapsed_ms: ms,
            input: ids.len(),
            kept: outcome.kept.len(),
            clusters: outcome.clusters,
            thresholds: merge_params,
        };
        let trace = &mut self.run.trace;
        trace.timings.truncate_after(if trace.filter.is_some() {
            "filter"
        } else {
            "scoring"
        });
        trace.timings.record("merge", ms);
        trace.merge = Some(stage);
        self.state = DetectorState::Merged;
        Ok(self.run.merged.insert(outcome.kept).as_slice())
    }

    /// Per-point symmetry and occlusion scores for every candidate.
    pub fn compute_point_scores(&self) -> Result<Vec<PointScores>, DetectError> {
        self.require_detected("compute_point_scores")?;
        let occupancy = self.occupancy.ok_or(DetectError::MissingOccupancyMap)?;
        let positions = self.run.downsampled.positions();
        let scorer = SymmetryScorer::new(
            &self.run.downsampled.points,
            &positions,
            occupancy,
            self.params.scoring_params(),
        );
        Ok(self
            .run
            .refined
            .iter()
            .map(|r| scorer.point_scores(&r.symmetry, &r.correspondences))
            .collect())
    }

    /// Refined candidates of the last `detect()`, empty before it.
    pub fn symmetries(&self) -> &[ReflectionalSymmetry] {
        &self.run.symmetries
    }

    pub fn filtered_ids(&self) -> Option<&[usize]> {
        self.run.filtered.as_deref()
    }

    pub fn merged_ids(&self) -> Option<&[usize]> {
        self.run.merged.as_deref()
    }

    pub fn scores(&self) -> &[SymmetryScores] {
        &self.run.scores
    }

    pub fn occlusion_scores(&self) -> Vec<f32> {
        self.run.scores.iter().map(|s| s.occlusion).collect()
    }

    pub fn cloud_inlier_scores(&self) -> Vec<f32> {
        self.run.scores.iter().map(|s| s.cloud_inlier).collect()
    }

    pub fn correspondence_inlier_scores(&self) -> Vec<f32> {
        self.run.scores.iter().map(|s| s.correspondence_inlier).collect()
    }

    pub fn reference_points(&self) -> &[Point3<f32>] {
        &self.run.reference_points
    }

    pub fn downsampled_cloud(&self) -> &PointCloud {
        &self.run.downsampled
    }

    /// Final correspondences of candidate `id`, one entry per downsampled point.
    pub fn correspondences(&self, id: usize) -> Option<&[PointMatch]> {
        self.run.refined.get(id).map(|r| r.correspondences.as_slice())
    }

    pub fn refinement_outcomes(&self) -> Vec<RefineOutcome> {
        self.run.refined.iter().map(|r| r.outcome).collect()
    }

    /// Snapshot of the last run for logging or JSON export.
    pub fn report(&self) -> DetectionReport {
        let symmetries = self
            .run
            .symmetries
            .iter()
            .zip(&self.run.reference_points)
            .zip(&self.run.scores)
            .enumerate()
            .map(|(id, ((s, r), scores))| SymmetryDescriptor::new(id, s, r, *scores))
            .collect();
        DetectionReport {
            input: InputDescriptor {
                points: self.run.input_points,
                downsampled_points: self.run.downsampled.len(),
                voxel_size: self.params.voxel_size,
            },
            symmetries,
            filtered_ids: self.run.filtered.clone(),
            merged_ids: self.run.merged.clone(),
            trace: self.run.trace.clone(),
        }
    }
}

/// Centroid of the points with accepted matches projected onto the plane,
/// or the projected cloud centroid when nothing matched.
fn reference_point(
    refined: &RefinedSymmetry,
    positions: &[Point3<f32>],
    centroid: &Point3<f32>,
) -> Point3<f32> {
    let matched = refined
        .correspondences
        .iter()
        .zip(positions)
        .filter(|(m, _)| m.is_accepted())
        .map(|(_, p)| p);
    let anchor = centroid_of(matched).unwrap_or(*centroid);
    refined.symmetry.project_point(&anchor)
}
