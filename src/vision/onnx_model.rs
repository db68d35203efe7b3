// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime landmark model
//!
//! The network is treated as a black box: an NCHW `[1, 3, H, W]` tensor in
//! [0, 1] goes in, and one of the following comes out:
//! - heatmaps `[1, N, h, w]` (one channel per landmark, peak = location)
//! - normalized coordinates `[1, N, 2]` or `[1, 2N]` as (x, y) pairs in [0, 1]

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayViewD, Axis, Ix2, Ix3, Ix4};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::VisionError;
use super::landmarks::Landmark;
use super::model::{LandmarkModel, ModelLoader};
use super::preprocessing::preprocess_for_landmarks;
use crate::config::{AnalysisConfig, ComputeDevice};

/// Loads [`OnnxLandmarkModel`] from `AnalysisConfig::model_path`
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxModelLoader;

impl ModelLoader for OnnxModelLoader {
    fn load(&self, config: &AnalysisConfig) -> Result<Box<dyn LandmarkModel>, VisionError> {
        let model = OnnxLandmarkModel::load(config)
            .map_err(|e| VisionError::ModelLoad(format!("{:#}", e)))?;
        info!("✅ Landmark model ready on {}", model.device());
        Ok(Box::new(model))
    }
}

/// Landmark network backed by an ONNX Runtime session
pub struct OnnxLandmarkModel {
    /// ONNX Runtime session (run requires exclusive access)
    session: Mutex<Session>,
    /// Model input name
    input_name: String,
    device: ComputeDevice,
}

impl std::fmt::Debug for OnnxLandmarkModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxLandmarkModel")
            .field("input_name", &self.input_name)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl OnnxLandmarkModel {
    /// Build a session for `config.model_path` on the config's resolved device
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load(config: &AnalysisConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("landmark model not found: {}", model_path.display());
        }

        let device = config.device();
        info!(
            "Loading landmark model from {} on {}",
            model_path.display(),
            device
        );

        let builder = Session::builder().context("Failed to create session builder")?;
        let builder = match device {
            ComputeDevice::Cuda => builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .context("Failed to set CUDA execution provider")?,
            ComputeDevice::Cpu => builder
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?,
        };

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load landmark model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        debug!("Landmark model loaded - input: {}", input_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            device,
        })
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }
}

impl LandmarkModel for OnnxLandmarkModel {
    fn predict(
        &self,
        image: &DynamicImage,
        config: &AnalysisConfig,
    ) -> Result<Vec<Landmark>, VisionError> {
        let tensor = preprocess_for_landmarks(image, config.input_width, config.input_height);
        let input_value = Value::from_array(tensor)
            .map_err(|e| VisionError::Inference(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::Inference("model session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| VisionError::Inference(e.to_string()))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| VisionError::Inference(format!("failed to extract output: {}", e)))?;

        debug!("Landmark output shape: {:?}", output.shape());

        decode_landmarks(output.view(), image.width(), image.height())
    }
}

/// Convert raw model output into landmarks in original-image pixel space
pub fn decode_landmarks(
    output: ArrayViewD<f32>,
    image_width: u32,
    image_height: u32,
) -> Result<Vec<Landmark>, VisionError> {
    let (width, height) = (image_width as f32, image_height as f32);

    if output.shape().first().copied().unwrap_or(0) == 0 {
        return Err(VisionError::Inference(format!(
            "empty model output {:?}",
            output.shape()
        )));
    }

    match output.ndim() {
        4 => {
            let heatmaps = output
                .into_dimensionality::<Ix4>()
                .map_err(|e| VisionError::Inference(e.to_string()))?;
            let heatmaps = heatmaps.index_axis_move(Axis(0), 0);
            let (_, map_h, map_w) = heatmaps.dim();
            if map_h == 0 || map_w == 0 {
                return Err(VisionError::Inference("empty heatmap".to_string()));
            }

            let scale_x = width / map_w as f32;
            let scale_y = height / map_h as f32;

            Ok(heatmaps
                .outer_iter()
                .enumerate()
                .filter_map(|(index, map)| {
                    let ((py, px), peak) = map.indexed_iter().fold(
                        ((0, 0), f32::NEG_INFINITY),
                        |best, (pos, &v)| if v > best.1 { (pos, v) } else { best },
                    );
                    // All-NaN or all -inf channels carry no location
                    if !peak.is_finite() {
                        warn!("Heatmap {} has no finite peak, skipping", index);
                        return None;
                    }
                    Some(Landmark::new(
                        index,
                        (px as f32 + 0.5) * scale_x,
                        (py as f32 + 0.5) * scale_y,
                        peak,
                    ))
                })
                .collect())
        }
        3 => {
            let coords = output
                .into_dimensionality::<Ix3>()
                .map_err(|e| VisionError::Inference(e.to_string()))?;
            if coords.dim().2 != 2 {
                return Err(VisionError::Inference(format!(
                    "unexpected coordinate output shape {:?}",
                    coords.shape()
                )));
            }
            Ok(coords
                .index_axis(Axis(0), 0)
                .outer_iter()
                .enumerate()
                .map(|(index, xy)| Landmark::new(index, xy[0] * width, xy[1] * height, 1.0))
                .collect())
        }
        2 => {
            let flat = output
                .into_dimensionality::<Ix2>()
                .map_err(|e| VisionError::Inference(e.to_string()))?;
            let row = flat.index_axis(Axis(0), 0);
            if row.len() % 2 != 0 {
                return Err(VisionError::Inference(format!(
                    "odd coordinate count {}",
                    row.len()
                )));
            }
            let values: Vec<f32> = row.iter().copied().collect();
            Ok(values
                .chunks_exact(2)
                .enumerate()
                .map(|(index, xy)| Landmark::new(index, xy[0] * width, xy[1] * height, 1.0))
                .collect())
        }
        _ => Err(VisionError::Inference(format!(
            "unsupported output shape {:?}",
            output.shape()
        ))),
    }
}
