//! Iterative refinement of symmetry candidates.
//!
//! Each round reflects every downsampled point through the current plane,
//! pairs the reflection with its nearest neighbour, and refits the plane to
//! the accepted pairs:
//! - normal: dominant eigenvector of the weighted scatter of `p_i − p_j`
//! - offset: weighted mean of `n · (p_i + p_j) / 2`
//!
//! For a fixed normal the offset is the exact least-squares optimum of the
//! reflected residual. Candidates that lose their support fall back to the
//! plane they started from.

use crate::angle::{angle_between_dirless, ramp};
use crate::cloud::{centroid_of, PointNormal};
use crate::detector::params::CorrespondenceParams;
use crate::spatial::PointGrid;
use crate::symmetry::ReflectionalSymmetry;
use log::warn;
use nalgebra::{Matrix3, Point3};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Accepted matches needed for a meaningful plane update.
pub const MIN_CORRESPONDENCES: usize = 3;

const NORMAL_TOL_RAD: f32 = 1e-4;
const OFFSET_TOL: f32 = 1e-5;
const EPS: f32 = 1e-12;

/// Result of the correspondence test for one source point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMatch {
    /// Accepted neighbour of the reflected point.
    pub target: Option<usize>,
    /// Distance from the reflection to its nearest neighbour, infinite when
    /// nothing lies within the search radius.
    pub distance: f32,
    /// Unoriented angle between reflected and neighbour normal.
    pub normal_angle: f32,
    /// Match weight in `[0, 1]`, zero for rejected points.
    pub quality: f32,
}

impl PointMatch {
    fn unmatched(distance: f32, normal_angle: f32) -> Self {
        Self {
            target: None,
            distance,
            normal_angle,
            quality: 0.0,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.target.is_some()
    }
}

/// Nearest-neighbour search reused by every candidate of one run.
pub struct CorrespondenceSearch<'c> {
    points: &'c [PointNormal],
    grid: PointGrid<'c>,
    centroid: Point3<f32>,
    params: CorrespondenceParams,
}

impl<'c> CorrespondenceSearch<'c> {
    /// `positions` must list the positions of `points` in the same order.
    pub fn new(
        points: &'c [PointNormal],
        positions: &'c [Point3<f32>],
        params: CorrespondenceParams,
    ) -> Self {
        debug_assert_eq!(points.len(), positions.len());
        let centroid = centroid_of(positions.iter()).unwrap_or_else(Point3::origin);
        Self {
            points,
            grid: PointGrid::build(positions, params.max_distance),
            centroid,
            params,
        }
    }

    pub fn points(&self) -> &'c [PointNormal] {
        self.points
    }

    pub fn centroid(&self) -> &Point3<f32> {
        &self.centroid
    }

    /// One [`PointMatch`] per point, in point order.
    pub fn find(&self, symmetry: &ReflectionalSymmetry) -> Vec<PointMatch> {
        let max_angle = self.params.max_normal_angle_rad;
        self.points
            .iter()
            .map(|p| {
                let reflected = symmetry.reflect_point(&p.position);
                let Some(hit) = self.grid.nearest_within(&reflected, self.params.max_distance)
                else {
                    return PointMatch::unmatched(f32::INFINITY, std::f32::consts::FRAC_PI_2);
                };
                let distance = hit.dist2.sqrt();
                let reflected_normal = symmetry.reflect_normal(&p.normal);
                let normal_angle =
                    angle_between_dirless(&reflected_normal, &self.points[hit.idx].normal);
                if normal_angle > max_angle {
                    return PointMatch::unmatched(distance, normal_angle);
                }
                PointMatch {
                    target: Some(hit.idx),
                    distance,
                    normal_angle,
                    quality: match_quality(distance, normal_angle, &self.params),
                }
            })
            .collect()
    }
}

/// Weight of an accepted match: full below the minimum normal angle, falling
/// linearly to zero at the maximum, scaled by the remaining distance slack.
pub fn match_quality(distance: f32, normal_angle: f32, params: &CorrespondenceParams) -> f32 {
    let angle_term = 1.0 - ramp(normal_angle, params.min_normal_angle_rad, params.max_normal_angle_rad);
    let distance_term = if params.max_distance > 0.0 {
        1.0 - (distance / params.max_distance).clamp(0.0, 1.0)
    } else {
        1.0
    };
    angle_term * distance_term
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefineOutcome {
    /// Update fell below the convergence threshold.
    Converged,
    /// Iteration cap reached while still moving.
    MaxIterations,
    /// Too little support; the starting plane was kept.
    Degenerate,
}

#[derive(Clone, Debug)]
pub struct RefinedSymmetry {
    pub symmetry: ReflectionalSymmetry,
    pub outcome: RefineOutcome,
    /// Plane updates applied.
    pub iterations: usize,
    /// Matches of `symmetry` itself, one per point.
    pub correspondences: Vec<PointMatch>,
}

impl RefinedSymmetry {
    pub fn accepted_count(&self) -> usize {
        self.correspondences.iter().filter(|m| m.is_accepted()).count()
    }
}

/// Least-squares reflection plane for the accepted matches.
///
/// Returns `None` with fewer than [`MIN_CORRESPONDENCES`] weighted matches or
/// when the scatter of pair differences vanishes.
pub fn fit_reflection(
    points: &[PointNormal],
    matches: &[PointMatch],
    previous: &ReflectionalSymmetry,
    centroid: &Point3<f32>,
) -> Option<ReflectionalSymmetry> {
    let mut scatter = Matrix3::<f32>::zeros();
    let mut pairs: Vec<(Point3<f32>, f32)> = Vec::new();
    for (i, m) in matches.iter().enumerate() {
        let Some(j) = m.target else { continue };
        if m.quality <= 0.0 {
            continue;
        }
        let (pi, pj) = (points[i].position, points[j].position);
        let v = pi - pj;
        scatter += v * v.transpose() * m.quality;
        pairs.push((nalgebra::center(&pi, &pj), m.quality));
    }
    if pairs.len() < MIN_CORRESPONDENCES {
        return None;
    }

    let eig = scatter.symmetric_eigen();
    let k = eig.eigenvalues.imax();
    if eig.eigenvalues[k] <= EPS {
        return None;
    }
    let mut normal = eig.eigenvectors.column(k).normalize();
    if normal.dot(previous.normal()) < 0.0 {
        normal = -normal;
    }

    let (mut num, mut den) = (0.0f64, 0.0f64);
    for (mid, w) in &pairs {
        num += (*w * normal.dot(&mid.coords)) as f64;
        den += *w as f64;
    }
    let offset = (num / den) as f32;
    ReflectionalSymmetry::new(Point3::from(normal * offset), normal)
        .map(|s| s.with_origin_near(centroid))
}

/// Refine one candidate for at most `max_iterations` updates.
pub fn refine_symmetry(
    search: &CorrespondenceSearch<'_>,
    initial: &ReflectionalSymmetry,
    max_iterations: usize,
) -> RefinedSymmetry {
    let mut current = *initial;
    let mut matches = search.find(&current);
    let mut iterations = 0;
    let mut outcome = RefineOutcome::MaxIterations;

    while iterations < max_iterations {
        let Some(next) = fit_reflection(search.points(), &matches, &current, search.centroid())
        else {
            warn!(
                "symmetry refinement degenerate after {} iterations; keeping initial plane",
                iterations
            );
            let correspondences = if iterations == 0 {
                matches
            } else {
                search.find(initial)
            };
            return RefinedSymmetry {
                symmetry: *initial,
                outcome: RefineOutcome::Degenerate,
                iterations,
                correspondences,
            };
        };
        iterations += 1;
        let converged =
            next.normal_angle(&current) < NORMAL_TOL_RAD && next.distance_to(&current) < OFFSET_TOL;
        current = next;
        matches = search.find(&current);
        if converged {
            outcome = RefineOutcome::Converged;
            break;
        }
    }

    RefinedSymmetry {
        symmetry: current,
        outcome,
        iterations,
        correspondences: matches,
    }
}

/// Refine every candidate independently; output order follows `candidates`.
pub fn refine_symmetries(
    search: &CorrespondenceSearch<'_>,
    candidates: &[ReflectionalSymmetry],
    max_iterations: usize,
) -> Vec<RefinedSymmetry> {
    #[cfg(feature = "parallel")]
    {
        candidates
            .par_iter()
            .map(|s| refine_symmetry(search, s, max_iterations))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        candidates
            .iter()
            .map(|s| refine_symmetry(search, s, max_iterations))
            .collect()
    }
}
