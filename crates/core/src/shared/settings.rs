use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CENTER_FACE_MODEL_NAME, DEFAULT_CONFIDENCE_FLOOR, DEFAULT_FEATHER_BLUR, DEFAULT_FEATHER_ERODE,
    DEFAULT_FRAME_RATE, DEFAULT_OVERLAP_THRESHOLD, DEFAULT_QUEUE_CAPACITY, DEFAULT_SMOOTHING_LERP,
    DEFAULT_WORKER_COUNT, FACE_MESH_MODEL_NAME, MAX_FRAME_RATE,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Tunables for the frame pipeline, persisted as JSON.
///
/// Missing fields fall back to their defaults, so a settings file only needs
/// to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub frame_rate: u32,
    pub confidence_floor: f32,
    pub overlap_threshold: f64,
    pub smoothing_lerp: f64,
    pub feather_erode: i32,
    pub feather_blur: i32,
    pub detector_model: String,
    pub mesh_model: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            frame_rate: DEFAULT_FRAME_RATE,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            smoothing_lerp: DEFAULT_SMOOTHING_LERP,
            feather_erode: DEFAULT_FEATHER_ERODE,
            feather_blur: DEFAULT_FEATHER_BLUR,
            detector_model: CENTER_FACE_MODEL_NAME.to_string(),
            mesh_model: FACE_MESH_MODEL_NAME.to_string(),
        }
    }
}

impl PipelineSettings {
    /// `<config_dir>/Lens/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Lens").join("settings.json"))
    }

    /// Loads settings from `path`, or from [`Self::default_path`] when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let settings = match path {
            Some(p) => Self::read(p)?,
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::read(&p)?,
                _ => Self::default(),
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.workers == 0 {
            return Err(SettingsError::Invalid("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(SettingsError::Invalid(
                "queue_capacity must be at least 1".into(),
            ));
        }
        if !(1..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(SettingsError::Invalid(format!(
                "frame_rate must be between 1 and {MAX_FRAME_RATE}, got {}",
                self.frame_rate
            )));
        }
        if !(0.0..1.0).contains(&self.confidence_floor) {
            return Err(SettingsError::Invalid(format!(
                "confidence_floor must be in [0, 1), got {}",
                self.confidence_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_lerp) {
            return Err(SettingsError::Invalid(format!(
                "smoothing_lerp must be in [0, 1], got {}",
                self.smoothing_lerp
            )));
        }
        if self.feather_blur < 0 {
            return Err(SettingsError::Invalid(format!(
                "feather_blur must not be negative, got {}",
                self.feather_blur
            )));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
