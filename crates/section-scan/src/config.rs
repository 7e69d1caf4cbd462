//! JSON run configuration for the command-line tool.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use section_scan_core::BisectionAxis;

use crate::params::ScanParams;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reference object used to derive the calibration scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    /// Index into the retained bounding boxes.
    pub box_index: usize,
    #[serde(default = "default_axis")]
    pub axis: BisectionAxis,
    /// Known size of the reference along `axis`, in real units.
    pub real_length: f64,
}

fn default_axis() -> BisectionAxis {
    BisectionAxis::Horizontal
}

/// Everything needed for a non-interactive measurement run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    pub image_path: String,
    /// Explicit scale; takes precedence over `reference`.
    #[serde(default)]
    pub pixels_per_metric: Option<f64>,
    #[serde(default)]
    pub reference: Option<ReferenceObject>,
    /// Snapshot indices of the confirmed circumferences.
    #[serde(default)]
    pub selection: Option<Vec<usize>>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub roi_path: Option<String>,
    #[serde(default)]
    pub preview_path: Option<String>,
    /// Directory for per-candidate and per-box review images.
    #[serde(default)]
    pub render_dir: Option<String>,
    #[serde(default)]
    pub params: ScanParams,
}

impl ScanConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_path.as_ref().map(PathBuf::from)
    }
}
