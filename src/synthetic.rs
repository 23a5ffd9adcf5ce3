//! Synthetic clouds with known mirror planes, used by the demo and tests.

use crate::cloud::PointCloud;
use nalgebra::{Point3, Vector3};

/// Surface samples of an axis-aligned box centred at `center`.
///
/// Every face is sampled at the centres of a regular grid with roughly
/// `spacing` pitch, so no sample lies on an edge and the cloud is exactly
/// mirror-symmetric about the three mid-planes. Normals point outwards.
pub fn box_surface(center: Point3<f32>, half_extents: Vector3<f32>, spacing: f32) -> PointCloud {
    let steps = |extent: f32| ((2.0 * extent / spacing.max(1e-4)).round() as usize).max(1);
    let coords = |extent: f32| {
        let n = steps(extent);
        let pitch = 2.0 * extent / n as f32;
        (0..n)
            .map(move |i| -extent + (i as f32 + 0.5) * pitch)
            .collect::<Vec<f32>>()
    };
    let (hx, hy, hz) = (half_extents.x.abs(), half_extents.y.abs(), half_extents.z.abs());
    let (xs, ys, zs) = (coords(hx), coords(hy), coords(hz));

    let mut cloud = PointCloud::new();
    for &s in &[-1.0f32, 1.0] {
        for &y in &ys {
            for &z in &zs {
                cloud.push(center + Vector3::new(s * hx, y, z), Vector3::new(s, 0.0, 0.0));
            }
        }
        for &x in &xs {
            for &z in &zs {
                cloud.push(center + Vector3::new(x, s * hy, z), Vector3::new(0.0, s, 0.0));
            }
        }
        for &x in &xs {
            for &y in &ys {
                cloud.push(center + Vector3::new(x, y, s * hz), Vector3::new(0.0, 0.0, s));
            }
        }
    }
    cloud
}

/// The eight corners of a cube with half edge `half_size`, normals along the
/// outward diagonals.
pub fn cube_corners(center: Point3<f32>, half_size: f32) -> PointCloud {
    let a = half_size.abs();
    let mut cloud = PointCloud::with_capacity(8);
    for &sx in &[-1.0f32, 1.0] {
        for &sy in &[-1.0f32, 1.0] {
            for &sz in &[-1.0f32, 1.0] {
                let dir = Vector3::new(sx, sy, sz);
                cloud.push(center + dir * a, dir.normalize());
            }
        }
    }
    cloud
}
