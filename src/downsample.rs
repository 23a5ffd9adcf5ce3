//! Voxel downsampling ahead of correspondence search.
//!
//! The detector treats downsampling as a pure function of `(cloud, voxel)`
//! behind [`Downsampler`]; [`VoxelGridDownsampler`] is the default.

use crate::cloud::{PointCloud, PointNormal};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

/// Pure point reduction strategy.
pub trait Downsampler: Sync {
    fn downsample(&self, cloud: &PointCloud, voxel_size: f32) -> PointCloud;
}

/// Voxel grid downsample (centroid). Voxel size in the same units as input.
///
/// Each occupied voxel emits one point: the centroid of its members and the
/// re-normalised sum of their normals. Output order follows the first member
/// of each voxel in the input, so the result is deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoxelGridDownsampler;

struct VoxelAccum {
    sum: [f64; 3],
    normal: Vector3<f32>,
    first_normal: Vector3<f32>,
    count: u32,
}

impl Downsampler for VoxelGridDownsampler {
    fn downsample(&self, cloud: &PointCloud, voxel_size: f32) -> PointCloud {
        if voxel_size <= 0.0 || !voxel_size.is_finite() {
            return cloud.clone();
        }
        let inv = 1.0 / voxel_size;

        let mut slots: HashMap<[i32; 3], usize> = HashMap::new();
        let mut voxels: Vec<VoxelAccum> = Vec::new();
        for p in cloud.iter() {
            let key = [
                (p.position.x * inv).floor() as i32,
                (p.position.y * inv).floor() as i32,
                (p.position.z * inv).floor() as i32,
            ];
            let slot = *slots.entry(key).or_insert_with(|| {
                voxels.push(VoxelAccum {
                    sum: [0.0; 3],
                    normal: Vector3::zeros(),
                    first_normal: p.normal,
                    count: 0,
                });
                voxels.len() - 1
            });
            let v = &mut voxels[slot];
            v.sum[0] += p.position.x as f64;
            v.sum[1] += p.position.y as f64;
            v.sum[2] += p.position.z as f64;
            // Unoriented normals: fold into the hemisphere of the first member.
            if p.normal.dot(&v.first_normal) < 0.0 {
                v.normal -= p.normal;
            } else {
                v.normal += p.normal;
            }
            v.count += 1;
        }

        voxels
            .into_iter()
            .map(|v| {
                let invc = 1.0 / v.count as f64;
                let position = Point3::new(
                    (v.sum[0] * invc) as f32,
                    (v.sum[1] * invc) as f32,
                    (v.sum[2] * invc) as f32,
                );
                let normal = v
                    .normal
                    .try_normalize(1e-9)
                    .unwrap_or(v.first_normal);
                PointNormal { position, normal }
            })
            .collect()
    }
}
