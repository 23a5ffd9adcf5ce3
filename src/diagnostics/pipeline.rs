use crate::diagnostics::{
    FilterStage, HypothesisStage, MergeStage, RefinementStage, TimingBreakdown,
};
use crate::score::SymmetryScores;
use crate::symmetry::ReflectionalSymmetry;
use serde::Serialize;

/// Snapshot returned by [`SymmetryDetector::report`](crate::SymmetryDetector::report).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub input: InputDescriptor,
    pub symmetries: Vec<SymmetryDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_ids: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_ids: Option<Vec<usize>>,
    pub trace: PipelineTrace,
}

impl DetectionReport {
    /// Candidates surviving the last stage that ran.
    pub fn final_ids(&self) -> Vec<usize> {
        self.merged_ids
            .as_ref()
            .or(self.filtered_ids.as_ref())
            .cloned()
            .unwrap_or_else(|| (0..self.symmetries.len()).collect())
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub points: usize,
    pub downsampled_points: usize,
    pub voxel_size: f32,
}

/// One refined candidate with its scores.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryDescriptor {
    pub id: usize,
    pub origin: [f32; 3],
    pub normal: [f32; 3],
    pub reference_point: [f32; 3],
    pub scores: SymmetryScores,
}

impl SymmetryDescriptor {
    pub fn new(
        id: usize,
        symmetry: &ReflectionalSymmetry,
        reference_point: &nalgebra::Point3<f32>,
        scores: SymmetryScores,
    ) -> Self {
        let o = symmetry.origin();
        let n = symmetry.normal();
        Self {
            id,
            origin: [o.x, o.y, o.z],
            normal: [n.x, n.y, n.z],
            reference_point: [reference_point.x, reference_point.y, reference_point.z],
            scores,
        }
    }
}

/// Stage-by-stage trace of the last run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub timings: TimingBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downsample_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypotheses: Option<HypothesisStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeStage>,
}
