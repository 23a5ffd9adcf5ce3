use crate::cloud::PointCloud;
use crate::detector::DetectionParams;
use crate::io::{load_point_cloud, read_json_file};
use crate::occupancy::CellState;
use crate::synthetic::{box_surface, cube_corners};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

/// Input cloud of a demo run.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneConfig {
    BoxSurface {
        #[serde(default)]
        center: [f32; 3],
        half_extents: [f32; 3],
        spacing: f32,
    },
    CubeCorners {
        #[serde(default)]
        center: [f32; 3],
        half_size: f32,
    },
    /// Cloud stored as JSON (see [`load_point_cloud`]).
    File { path: PathBuf },
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig::BoxSurface {
            center: [0.0; 3],
            half_extents: [0.15, 0.1, 0.05],
            spacing: 0.01,
        }
    }
}

impl SceneConfig {
    pub fn build(&self) -> Result<PointCloud, String> {
        match self {
            SceneConfig::BoxSurface {
                center,
                half_extents,
                spacing,
            } => Ok(box_surface(
                Point3::from(*center),
                Vector3::from(*half_extents),
                *spacing,
            )),
            SceneConfig::CubeCorners { center, half_size } => {
                Ok(cube_corners(Point3::from(*center), *half_size))
            }
            SceneConfig::File { path } => load_point_cloud(path),
        }
    }
}

fn default_occupancy() -> CellState {
    CellState::Free
}

#[derive(Clone, Debug, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub params: DetectionParams,
    #[serde(default)]
    pub scene: SceneConfig,
    /// State answered by the uniform occupancy map of the demo.
    #[serde(default = "default_occupancy")]
    pub occupancy: CellState,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            params: DetectionParams::default(),
            scene: SceneConfig::default(),
            occupancy: default_occupancy(),
            output: OutputConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<DemoConfig, String> {
    read_json_file(path).map_err(|e| format!("Invalid config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_tagged_by_kind() {
        let config: DemoConfig = serde_json::from_str(
            r#"{
                "params": { "max_correspondence_reflected_distance": 0.02 },
                "scene": { "kind": "cube_corners", "half_size": 0.1 },
                "occupancy": "Unknown",
                "output": { "json_out": "out/report.json" }
            }"#,
        )
        .unwrap();
        assert!((config.params.max_correspondence_reflected_distance - 0.02).abs() < 1e-9);
        assert_eq!(config.params.refine_iterations, 20);
        assert_eq!(config.occupancy, CellState::Unknown);
        assert_eq!(config.scene.build().unwrap().len(), 8);
        assert_eq!(
            config.output.json_out.as_deref(),
            Some(Path::new("out/report.json"))
        );
    }

    #[test]
    fn load_config_reports_path_on_failure() {
        let dir = std::env::temp_dir().join(format!("symmetry-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.starts_with("Invalid config: Failed to parse"));
        assert!(err.contains("broken.json"));

        std::fs::write(&path, r#"{ "occupancy": "Occluded" }"#).unwrap();
        assert_eq!(load_config(&path).unwrap().occupancy, CellState::Occluded);
        let _ = std::fs::remove_dir_all(&dir);

        let err = load_config(Path::new("/nonexistent/demo.json")).unwrap_err();
        assert!(err.starts_with("Invalid config: Failed to read"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: DemoConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.occupancy, CellState::Free);
        assert_eq!(config.scene.build().unwrap().len(), 2200);
    }
}
