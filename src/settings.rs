use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One light entry in the settings file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LightSettings {
    pub position: [f32; 3],
    pub intensity: [f32; 3],
}

/// Plain render configuration; CLI flags override individual fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub model_path: PathBuf,
    pub camera_position: [f32; 3],
    pub camera_phi: f32,
    pub camera_theta: f32,
    pub camera_angle_of_view: f32,
    pub camera_z_near: f32,
    pub camera_z_far: f32,
    pub raytracing_depth: u32,
    pub accumulation_num: u32,
    pub sample_seed: u64,
    pub lights: Vec<LightSettings>,
    pub result_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            model_path: PathBuf::from("models/cornell_box.obj"),
            camera_position: [0.0, 1.0, 3.3],
            camera_phi: 0.0,
            camera_theta: 0.0,
            camera_angle_of_view: 60.0,
            camera_z_near: 0.001,
            camera_z_far: 100.0,
            raytracing_depth: 3,
            accumulation_num: 1,
            sample_seed: 0,
            lights: vec![LightSettings {
                position: [0.0, 1.58, -0.03],
                intensity: [0.78, 0.78, 0.78],
            }],
            result_path: PathBuf::from("result.png"),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }
}
