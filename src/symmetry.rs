//! Reflectional symmetry primitive: a mirror plane given by a point on the
//! plane and a unit normal.
//!
//! Values are immutable. Every stage that "adjusts" a plane builds a new one.

use crate::angle::angle_between_dirless;
use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

const EPS: f32 = 1e-9;

/// Mirror plane `{x : n · (x − origin) = 0}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReflectionalSymmetry {
    origin: Point3<f32>,
    normal: Unit<Vector3<f32>>,
}

impl ReflectionalSymmetry {
    /// Build a plane through `origin` with the given normal direction.
    /// Returns `None` when the normal is (numerically) zero or non-finite.
    pub fn new(origin: Point3<f32>, normal: Vector3<f32>) -> Option<Self> {
        if !normal.iter().all(|v| v.is_finite()) || !origin.iter().all(|v| v.is_finite()) {
            return None;
        }
        let normal = Unit::try_new(normal, EPS)?;
        Some(Self { origin, normal })
    }

    pub fn origin(&self) -> &Point3<f32> {
        &self.origin
    }

    pub fn normal(&self) -> &Vector3<f32> {
        self.normal.as_ref()
    }

    /// Signed distance of `p` to the plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3<f32>) -> f32 {
        self.normal.dot(&(p - self.origin))
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project_point(&self, p: &Point3<f32>) -> Point3<f32> {
        p - self.normal.as_ref() * self.signed_distance(p)
    }

    /// Mirror image of `p` through the plane.
    pub fn reflect_point(&self, p: &Point3<f32>) -> Point3<f32> {
        p - self.normal.as_ref() * (2.0 * self.signed_distance(p))
    }

    /// Mirror image of a direction (normals, tangents) through the plane.
    pub fn reflect_normal(&self, v: &Vector3<f32>) -> Vector3<f32> {
        v - self.normal.as_ref() * (2.0 * self.normal.dot(v))
    }

    /// Same plane, with its reference origin moved to the projection of `p`.
    pub fn with_origin_near(&self, p: &Point3<f32>) -> Self {
        Self {
            origin: self.project_point(p),
            normal: self.normal,
        }
    }

    /// Unoriented angle between the two plane normals, in `[0, π/2]`.
    pub fn normal_angle(&self, other: &Self) -> f32 {
        angle_between_dirless(self.normal.as_ref(), other.normal.as_ref())
    }

    /// Symmetric offset between two planes: the larger of the distances from
    /// each plane's origin to the other plane.
    pub fn distance_to(&self, other: &Self) -> f32 {
        self.signed_distance(&other.origin)
            .abs()
            .max(other.signed_distance(&self.origin).abs())
    }
}
