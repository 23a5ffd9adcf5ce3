//! Parameter types configuring the detector stages.
//!
//! [`DetectionParams`] is the flat record read by every stage of one run:
//! downsampling, hypothesis generation, refinement, scoring, filtering and
//! merging. Stage-local views ([`CorrespondenceParams`], [`ScoringParams`],
//! [`FilterParams`], [`MergeParams`]) are derived from it so that each stage
//! only sees the knobs it uses, already converted to radians.
//!
//! Defaults target tabletop scenes measured in metres. For tuning, start with
//! `max_correspondence_reflected_distance` (roughly the sensor noise) and the
//! filter thresholds.

use serde::{Deserialize, Serialize};

/// Detector-wide parameters controlling the multi-stage pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Voxel edge used to downsample the input cloud. `0` disables downsampling.
    pub voxel_size: f32,

    /// Number of rotation steps over `[0, π)` used to seed hypotheses.
    pub num_angle_divisions: usize,
    /// Ratio `λmin / λmax` of principal variances below which the cloud is
    /// treated as flat and only in-plane normals are sampled.
    pub flatness_threshold: f32,

    /// Maximum refinement rounds per candidate.
    pub refine_iterations: usize,

    /// Maximum distance between a reflected point and its correspondence.
    pub max_correspondence_reflected_distance: f32,
    /// Reflections closer than this to the observed surface are never penalised.
    pub min_occlusion_distance: f32,
    /// Distance to the observed surface at which the occlusion penalty saturates.
    pub max_occlusion_distance: f32,
    /// Normal disagreement (degrees) below which a correspondence is a full inlier.
    pub min_inlier_normal_angle_deg: f32,
    /// Normal disagreement (degrees) above which a correspondence is rejected.
    pub max_inlier_normal_angle_deg: f32,

    /// Filter: maximum accepted occlusion score.
    pub max_occlusion_score: f32,
    /// Filter: minimum fraction of the cloud participating in the symmetry.
    pub min_cloud_inlier_score: f32,
    /// Filter: minimum inlier-to-outlier mass ratio over correspondences.
    pub min_corresp_inlier_score: f32,

    /// Merge: maximum angle (degrees) between normals of merged symmetries.
    pub symmetry_min_angle_diff_deg: f32,
    /// Merge: maximum plane offset between merged symmetries.
    pub symmetry_min_distance_diff: f32,
    /// Merge: maximum distance between reference points; negative disables the check.
    pub max_reference_point_distance: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            voxel_size: 0.0,
            num_angle_divisions: 5,
            flatness_threshold: 0.005,
            refine_iterations: 20,
            max_correspondence_reflected_distance: 0.01,
            min_occlusion_distance: 0.01,
            max_occlusion_distance: 0.2,
            min_inlier_normal_angle_deg: 10.0,
            max_inlier_normal_angle_deg: 15.0,
            max_occlusion_score: 0.01,
            min_cloud_inlier_score: 0.2,
            min_corresp_inlier_score: 4.0,
            symmetry_min_angle_diff_deg: 7.0,
            symmetry_min_distance_diff: 0.02,
            max_reference_point_distance: 0.3,
        }
    }
}

impl DetectionParams {
    pub fn correspondence_params(&self) -> CorrespondenceParams {
        CorrespondenceParams {
            max_distance: self.max_correspondence_reflected_distance.max(0.0),
            min_normal_angle_rad: self.min_inlier_normal_angle_deg.to_radians(),
            max_normal_angle_rad: self.max_inlier_normal_angle_deg.to_radians(),
        }
    }

    pub fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            min_occlusion_distance: self.min_occlusion_distance.max(0.0),
            max_occlusion_distance: self.max_occlusion_distance.max(0.0),
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            max_occlusion_score: self.max_occlusion_score,
            min_cloud_inlier_score: self.min_cloud_inlier_score,
            min_corresp_inlier_score: self.min_corresp_inlier_score,
        }
    }

    pub fn merge_params(&self) -> MergeParams {
        MergeParams {
            max_normal_angle_rad: self.symmetry_min_angle_diff_deg.to_radians(),
            max_distance: self.symmetry_min_distance_diff,
            max_reference_point_distance: self.max_reference_point_distance,
        }
    }
}

/// Acceptance window for reflected correspondences.
///
/// A correspondence is accepted when the reflected point lies within
/// `max_distance` of its neighbour and the normal disagreement is at most
/// `max_normal_angle_rad`. Between the two angle bounds the match is a
/// partial inlier whose quality falls linearly to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrespondenceParams {
    pub max_distance: f32,
    pub min_normal_angle_rad: f32,
    pub max_normal_angle_rad: f32,
}

impl Default for CorrespondenceParams {
    fn default() -> Self {
        DetectionParams::default().correspondence_params()
    }
}

/// Distance window of the occlusion penalty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringParams {
    pub min_occlusion_distance: f32,
    pub max_occlusion_distance: f32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        DetectionParams::default().scoring_params()
    }
}

/// Score thresholds applied by the symmetry filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub max_occlusion_score: f32,
    pub min_cloud_inlier_score: f32,
    pub min_corresp_inlier_score: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        DetectionParams::default().filter_params()
    }
}

/// Similarity thresholds for merging duplicate symmetries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeParams {
    pub max_normal_angle_rad: f32,
    pub max_distance: f32,
    /// Negative disables the reference point gate.
    pub max_reference_point_distance: f32,
}

impl Default for MergeParams {
    fn default() -> Self {
        DetectionParams::default().merge_params()
    }
}
