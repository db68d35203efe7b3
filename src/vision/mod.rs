// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cephalometric landmark analysis
//!
//! This module provides:
//! - Model seams (`ModelLoader`, `LandmarkModel`) and the ONNX Runtime implementation
//! - `CephImage`, which decodes a staged file, runs the model and draws markers
//! - Normalized pixel buffers and JPEG encoding

pub mod ceph_image;
pub mod error;
pub mod image_utils;
pub mod landmarks;
pub mod model;
pub mod onnx_model;
pub mod preprocessing;

pub use ceph_image::CephImage;
pub use error::VisionError;
pub use image_utils::{decode_image_bytes, encode_jpeg, NormalizedImage, JPEG_QUALITY};
pub use landmarks::Landmark;
pub use model::{LandmarkModel, ModelLoader};
pub use onnx_model::{OnnxLandmarkModel, OnnxModelLoader};
