//! Per-candidate symmetry scores.
//!
//! Scores are pure functions of the plane, the downsampled cloud, the
//! occupancy map and the plane's final correspondences:
//! - `occlusion`: mean penalty of reflections landing in unobserved space
//!   away from the observed surface.
//! - `cloud_inlier`: fraction of points with an accepted correspondence.
//! - `correspondence_inlier`: inlier mass over outlier mass of the accepted
//!   correspondences.

use crate::angle::ramp;
use crate::cloud::PointNormal;
use crate::detector::params::ScoringParams;
use crate::occupancy::OccupancyQuery;
use crate::refine::{PointMatch, RefinedSymmetry};
use crate::spatial::PointGrid;
use crate::symmetry::ReflectionalSymmetry;
use nalgebra::Point3;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryScores {
    pub occlusion: f32,
    pub cloud_inlier: f32,
    pub correspondence_inlier: f32,
}

/// Per-point breakdown of one candidate, in point order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointScores {
    /// `1 − quality` of the point's match, `1` when unmatched.
    pub symmetry: Vec<f32>,
    /// Occlusion penalty of the point's reflection.
    pub occlusion: Vec<f32>,
}

/// Scoring context shared by all candidates of one run.
pub struct SymmetryScorer<'c> {
    points: &'c [PointNormal],
    surface: PointGrid<'c>,
    occupancy: &'c dyn OccupancyQuery,
    params: ScoringParams,
}

impl<'c> SymmetryScorer<'c> {
    pub fn new(
        points: &'c [PointNormal],
        positions: &'c [Point3<f32>],
        occupancy: &'c dyn OccupancyQuery,
        params: ScoringParams,
    ) -> Self {
        let cell = (0.25 * params.max_occlusion_distance).max(1e-4);
        Self {
            points,
            surface: PointGrid::build(positions, cell),
            occupancy,
            params,
        }
    }

    /// Penalty of one point's reflection under `symmetry`.
    fn point_occlusion(&self, symmetry: &ReflectionalSymmetry, i: usize, m: &PointMatch) -> f32 {
        if m.is_accepted() {
            return 0.0;
        }
        let reflected = symmetry.reflect_point(&self.points[i].position);
        if !self.occupancy.classify(&reflected).is_unobserved() {
            return 0.0;
        }
        let max = self.params.max_occlusion_distance;
        let distance = self
            .surface
            .nearest_within(&reflected, max)
            .map_or(max, |n| n.dist2.sqrt());
        ramp(distance, self.params.min_occlusion_distance, max)
    }

    pub fn score(&self, symmetry: &ReflectionalSymmetry, matches: &[PointMatch]) -> SymmetryScores {
        if matches.is_empty() {
            return SymmetryScores::default();
        }
        debug_assert_eq!(matches.len(), self.points.len());

        let mut accepted = 0usize;
        let mut quality = 0.0f64;
        let mut occlusion = 0.0f64;
        for (i, m) in matches.iter().enumerate() {
            if m.is_accepted() {
                accepted += 1;
                quality += m.quality as f64;
            }
            occlusion += self.point_occlusion(symmetry, i, m) as f64;
        }
        let n = matches.len() as f64;
        let outlier_mass = (accepted as f64 - quality).max(1.0);
        SymmetryScores {
            occlusion: (occlusion / n) as f32,
            cloud_inlier: (accepted as f64 / n) as f32,
            correspondence_inlier: (quality / outlier_mass) as f32,
        }
    }

    pub fn point_scores(&self, symmetry: &ReflectionalSymmetry, matches: &[PointMatch]) -> PointScores {
        let symmetry_scores = matches
            .iter()
            .map(|m| if m.is_accepted() { 1.0 - m.quality } else { 1.0 })
            .collect();
        let occlusion = matches
            .iter()
            .enumerate()
            .map(|(i, m)| self.point_occlusion(symmetry, i, m))
            .collect();
        PointScores {
            symmetry: symmetry_scores,
            occlusion,
        }
    }
}

/// Score every refined candidate; output order follows `refined`.
pub fn score_symmetries(scorer: &SymmetryScorer<'_>, refined: &[RefinedSymmetry]) -> Vec<SymmetryScores> {
    #[cfg(feature = "parallel")]
    {
        refined
            .par_iter()
            .map(|r| scorer.score(&r.symmetry, &r.correspondences))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        refined
            .iter()
            .map(|r| scorer.score(&r.symmetry, &r.correspondences))
            .collect()
    }
}
