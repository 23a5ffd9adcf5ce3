//! Initial symmetry hypotheses from principal axes and angular sampling.
//!
//! This stage produces the candidate planes that refinement starts from:
//! - The cloud centroid and principal axes (covariance eigen-decomposition).
//! - For flat clouds, normals sampled on the great circle inside the support
//!   plane; the support plane itself is never proposed.
//! - Otherwise, normals sampled on the three principal great circles, with
//!   near-coincident orientations dropped.
//!
//! Every candidate passes through the centroid.

use crate::angle::angle_between_dirless;
use crate::cloud::{centroid_of, covariance_of};
use crate::symmetry::ReflectionalSymmetry;
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use serde::Serialize;

const EPS: f32 = 1e-12;

/// Centroid and principal axes, major first.
#[derive(Clone, Debug)]
pub struct PrincipalAxes {
    pub mean: Point3<f32>,
    pub axes: [Vector3<f32>; 3],
    pub variances: [f32; 3],
}

impl PrincipalAxes {
    /// Smallest over largest principal variance, in `[0, 1]`.
    pub fn flatness(&self) -> f32 {
        if self.variances[0] <= EPS {
            return 0.0;
        }
        (self.variances[2] / self.variances[0]).clamp(0.0, 1.0)
    }
}

/// Principal axes of `points`; `None` for empty or fully coincident input.
pub fn principal_axes(points: &[Point3<f32>]) -> Option<PrincipalAxes> {
    let mean = centroid_of(points.iter())?;
    let cov = covariance_of(points, &mean);
    let eig = cov.symmetric_eigen();

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));
    if eig.eigenvalues[order[0]] <= EPS {
        return None;
    }

    let mut axes = [Vector3::zeros(); 3];
    let mut variances = [0.0f32; 3];
    for (slot, &k) in order.iter().enumerate() {
        axes[slot] = eig.eigenvectors.column(k).normalize();
        variances[slot] = eig.eigenvalues[k].max(0.0);
    }
    Some(PrincipalAxes {
        mean,
        axes,
        variances,
    })
}

/// Where the candidate set came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HypothesisSource {
    /// Supplied by the caller, used as-is.
    Provided,
    /// Synthesised from the cloud's principal axes.
    Generated { flat: bool },
}

#[derive(Clone, Debug)]
pub struct HypothesisSet {
    pub symmetries: Vec<ReflectionalSymmetry>,
    pub source: HypothesisSource,
}

/// Candidate planes for `points`, or the caller-supplied set when present.
pub fn initial_hypotheses(
    provided: Option<&[ReflectionalSymmetry]>,
    points: &[Point3<f32>],
    num_divisions: usize,
    flatness_threshold: f32,
) -> HypothesisSet {
    match provided {
        Some(symmetries) if !symmetries.is_empty() => HypothesisSet {
            symmetries: symmetries.to_vec(),
            source: HypothesisSource::Provided,
        },
        _ => generate_hypotheses(points, num_divisions, flatness_threshold),
    }
}

/// Sample candidate planes from the principal axes of `points`.
pub fn generate_hypotheses(
    points: &[Point3<f32>],
    num_divisions: usize,
    flatness_threshold: f32,
) -> HypothesisSet {
    let empty = |flat| HypothesisSet {
        symmetries: Vec::new(),
        source: HypothesisSource::Generated { flat },
    };
    if points.len() < 2 || num_divisions == 0 {
        return empty(false);
    }
    let Some(pa) = principal_axes(points) else {
        return empty(false);
    };
    let [e0, e1, e2] = pa.axes;
    let flat = pa.flatness() < flatness_threshold;

    let circles: &[(Vector3<f32>, Vector3<f32>)] = if flat {
        &[(e2, e0)]
    } else {
        &[(e2, e0), (e1, e2), (e0, e1)]
    };

    let step = std::f32::consts::PI / num_divisions as f32;
    let duplicate_tol = 0.25 * step;
    let mut normals: Vec<Vector3<f32>> = Vec::with_capacity(circles.len() * num_divisions);
    for (axis, base) in circles {
        let axis = Unit::new_normalize(*axis);
        for k in 0..num_divisions {
            let n = Rotation3::from_axis_angle(&axis, k as f32 * step) * base;
            let duplicate = normals
                .iter()
                .any(|m| angle_between_dirless(m, &n) < duplicate_tol);
            if !duplicate {
                normals.push(n);
            }
        }
    }

    let symmetries = normals
        .into_iter()
        .filter_map(|n| ReflectionalSymmetry::new(pa.mean, n))
        .collect();
    HypothesisSet {
        symmetries,
        source: HypothesisSource::Generated { flat },
    }
}
