// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Landmark analysis configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::device::{ComputeDevice, DevicePreference};
use super::ConfigError;

/// Landmarks in the ISBI cephalometric annotation scheme
pub const DEFAULT_NUM_LANDMARKS: usize = 19;

/// Options for one landmark analysis run.
///
/// A process-wide instance is loaded at startup and treated as a template;
/// each request works on its own clone produced by [`AnalysisConfig::for_image`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Single image to analyze
    pub image_src: Option<PathBuf>,
    /// Directory of images for batch runs
    pub image_folder: Option<PathBuf>,
    /// ONNX landmark model weights
    pub model_path: PathBuf,
    /// Requested compute device
    pub device: DevicePreference,
    /// Device chosen after resolution against the host
    #[serde(skip)]
    pub resolved_device: Option<ComputeDevice>,
    /// Model input width in pixels
    pub input_width: u32,
    /// Model input height in pixels
    pub input_height: u32,
    /// Number of landmarks the model emits
    pub num_landmarks: usize,
    /// Radius of the disc drawn at each landmark
    pub marker_radius: u32,
    /// RGB color of the landmark markers
    pub marker_color: [u8; 3],
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            image_src: None,
            image_folder: None,
            model_path: PathBuf::from("./models/cephalometric-landmarks.onnx"),
            device: DevicePreference::Auto,
            resolved_device: None,
            input_width: 640,
            input_height: 800,
            num_landmarks: DEFAULT_NUM_LANDMARKS,
            marker_radius: 6,
            marker_color: [255, 0, 0],
            intra_threads: 4,
        }
    }
}

impl AnalysisConfig {
    /// Load the default template, optionally overlaid by a TOML file.
    ///
    /// Keys missing from the file keep their built-in values.
    pub fn load_defaults(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ConfigError::Invalid {
                field: "input_width/input_height".to_string(),
                message: format!(
                    "model input must be non-empty, got {}x{}",
                    self.input_width, self.input_height
                ),
            });
        }

        if self.num_landmarks == 0 {
            return Err(ConfigError::Invalid {
                field: "num_landmarks".to_string(),
                message: "at least one landmark is required".to_string(),
            });
        }

        if self.intra_threads == 0 {
            return Err(ConfigError::Invalid {
                field: "intra_threads".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Request-scoped copy bound to one staged image.
    ///
    /// The batch directory is always cleared so analysis runs in single-image mode.
    pub fn for_image(&self, image_path: impl Into<PathBuf>) -> Self {
        let mut config = self.clone();
        config.image_src = Some(image_path.into());
        config.image_folder = None;
        config
    }

    pub fn resolve_device(mut self, available: ComputeDevice) -> Self {
        self.resolved_device = Some(self.device.resolve(available));
        self
    }

    /// Device to run on; unresolved configs run on CPU.
    pub fn device(&self) -> ComputeDevice {
        self.resolved_device.unwrap_or(ComputeDevice::Cpu)
    }
}
