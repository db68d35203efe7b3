// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

/// Failures raised by model loading, analysis and encoding
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Failed to load landmark model: {0}")]
    ModelLoad(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Landmark inference failed: {0}")]
    Inference(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// Request configuration unusable for analysis
    #[error("Invalid analysis configuration: {0}")]
    Config(String),
}
