//! Scene occupancy queries.
//!
//! The detector never builds occupancy information itself. It only asks
//! "what is known about this location?" through [`OccupancyQuery`], so any
//! sensor-derived map (ray-cast voxel grids, octrees, depth-image frusta) can
//! be plugged in. Two small implementations are provided for synthetic
//! scenes and tests.

use hashbrown::HashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Knowledge state of a location in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// A surface was observed here.
    Observed,
    /// Sensor rays passed through: observed empty space.
    Free,
    /// Hidden behind an observed surface.
    Occluded,
    /// Outside the mapped volume.
    #[default]
    Unknown,
}

impl CellState {
    /// True when the sensor never saw this location.
    pub fn is_unobserved(self) -> bool {
        matches!(self, CellState::Occluded | CellState::Unknown)
    }
}

/// Read-only occupancy oracle shared by every candidate during scoring.
pub trait OccupancyQuery: Sync {
    fn classify(&self, point: &Point3<f32>) -> CellState;
}

/// Map answering the same state everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformOccupancy(pub CellState);

impl OccupancyQuery for UniformOccupancy {
    fn classify(&self, _point: &Point3<f32>) -> CellState {
        self.0
    }
}

/// Sparse voxel map: explicitly set cells plus a default for everything else.
#[derive(Clone, Debug)]
pub struct VoxelOccupancyMap {
    resolution: f32,
    inv_resolution: f32,
    default_state: CellState,
    cells: HashMap<[i32; 3], CellState>,
}

impl VoxelOccupancyMap {
    /// Create an empty map with `resolution` metres per voxel edge.
    pub fn new(resolution: f32, default_state: CellState) -> Self {
        let resolution = resolution.max(1e-6);
        Self {
            resolution,
            inv_resolution: 1.0 / resolution,
            default_state,
            cells: HashMap::new(),
        }
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn default_state(&self) -> CellState {
        self.default_state
    }

    /// Number of explicitly stored voxels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn key(&self, p: &Point3<f32>) -> [i32; 3] {
        [
            (p.x * self.inv_resolution).floor() as i32,
            (p.y * self.inv_resolution).floor() as i32,
            (p.z * self.inv_resolution).floor() as i32,
        ]
    }

    /// Set the state of the voxel containing `p`.
    pub fn set(&mut self, p: &Point3<f32>, state: CellState) {
        let key = self.key(p);
        self.cells.insert(key, state);
    }

    /// Set every voxel overlapping the axis-aligned box `[min, max]`.
    pub fn fill_box(&mut self, min: &Point3<f32>, max: &Point3<f32>, state: CellState) {
        let lo = self.key(min);
        let hi = self.key(max);
        for ix in lo[0]..=hi[0] {
            for iy in lo[1]..=hi[1] {
                for iz in lo[2]..=hi[2] {
                    self.cells.insert([ix, iy, iz], state);
                }
            }
        }
    }
}

impl OccupancyQuery for VoxelOccupancyMap {
    fn classify(&self, point: &Point3<f32>) -> CellState {
        self.cells
            .get(&self.key(point))
            .copied()
            .unwrap_or(self.default_state)
    }
}
