//! JSON file helpers for clouds, configs and reports.

use crate::cloud::PointCloud;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

/// Load a cloud stored as `{"points": [{"position": [..], "normal": [..]}, ..]}`.
pub fn load_point_cloud(path: &Path) -> Result<PointCloud, String> {
    read_json_file(path)
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
