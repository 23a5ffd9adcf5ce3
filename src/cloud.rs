//! Point cloud data model consumed by the detector.
//!
//! The detector only ever reads clouds: positions and normals are indexed by
//! their position in `points`, and every stage refers back to them by index.

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A single oriented sample: position plus (unit or unnormalised) normal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointNormal {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl PointNormal {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// Ordered, indexed sequence of oriented points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<PointNormal>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, position: Point3<f32>, normal: Vector3<f32>) {
        self.points.push(PointNormal { position, normal });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointNormal> {
        self.points.iter()
    }

    /// Positions only, in cloud order.
    pub fn positions(&self) -> Vec<Point3<f32>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Arithmetic mean of the positions, `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        centroid_of(self.points.iter().map(|p| &p.position))
    }
}

impl FromIterator<PointNormal> for PointCloud {
    fn from_iter<I: IntoIterator<Item = PointNormal>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Mean of a set of points, accumulated in f64 to keep large clouds stable.
pub fn centroid_of<'p, I>(points: I) -> Option<Point3<f32>>
where
    I: IntoIterator<Item = &'p Point3<f32>>,
{
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for p in points {
        sum[0] += p.x as f64;
        sum[1] += p.y as f64;
        sum[2] += p.z as f64;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let inv = 1.0 / count as f64;
    Some(Point3::new(
        (sum[0] * inv) as f32,
        (sum[1] * inv) as f32,
        (sum[2] * inv) as f32,
    ))
}

/// Covariance of the positions about `mean` (population normalisation).
pub fn covariance_of(points: &[Point3<f32>], mean: &Point3<f32>) -> Matrix3<f32> {
    let mut c = Matrix3::<f32>::zeros();
    if points.is_empty() {
        return c;
    }
    for p in points {
        let v = p - mean;
        c += v * v.transpose();
    }
    c / points.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_empty_is_none() {
        assert!(PointCloud::new().centroid().is_none());
    }

    #[test]
    fn centroid_averages_positions() {
        let mut cloud = PointCloud::new();
        cloud.push(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        cloud.push(Point3::new(2.0, 4.0, -2.0), Vector3::z());
        let c = cloud.centroid().unwrap();
        assert!((c - Point3::new(1.0, 2.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn covariance_of_line_has_single_direction() {
        let pts: Vec<Point3<f32>> = (0..5).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
        let mean = centroid_of(pts.iter()).unwrap();
        let c = covariance_of(&pts, &mean);
        assert!((c[(0, 0)] - 2.0).abs() < 1e-5);
        assert!(c[(1, 1)].abs() < 1e-6);
        assert!(c[(2, 2)].abs() < 1e-6);
    }
}
