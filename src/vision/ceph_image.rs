// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! A single cephalogram moving through analysis and annotation

use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::error::VisionError;
use super::image_utils::{load_image_file, NormalizedImage, JPEG_QUALITY};
use super::landmarks::{draw_marker, Landmark};
use super::model::LandmarkModel;
use crate::config::AnalysisConfig;

/// Image bound to a file path, its normalized buffer and detected landmarks.
///
/// `process` fills `landmarks`; `mark_landmarks` then draws them into the
/// buffer in place. The buffer keeps the source dimensions throughout.
#[derive(Debug)]
pub struct CephImage {
    path: PathBuf,
    source: DynamicImage,
    image: NormalizedImage,
    landmarks: Vec<Landmark>,
}

impl CephImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VisionError> {
        let path = path.as_ref();
        let source = load_image_file(path)?;
        let image = NormalizedImage::from_dynamic(&source);

        Ok(Self {
            path: path.to_path_buf(),
            source,
            image,
            landmarks: Vec::new(),
        })
    }

    /// Run the model and keep its landmarks
    pub fn process(
        &mut self,
        model: &dyn LandmarkModel,
        config: &AnalysisConfig,
    ) -> Result<&[Landmark], VisionError> {
        let landmarks = model.predict(&self.source, config)?;

        if landmarks.len() != config.num_landmarks {
            warn!(
                "Model returned {} landmarks, expected {}",
                landmarks.len(),
                config.num_landmarks
            );
        }

        self.landmarks = landmarks;
        Ok(&self.landmarks)
    }

    /// Log each landmark and draw its marker onto the buffer
    pub fn mark_landmarks(&mut self, config: &AnalysisConfig) {
        for landmark in &self.landmarks {
            info!(
                index = landmark.index,
                x = landmark.x,
                y = landmark.y,
                confidence = landmark.confidence,
                "landmark"
            );
            draw_marker(
                &mut self.image,
                landmark,
                config.marker_radius,
                config.marker_color,
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &NormalizedImage {
        &self.image
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Encode the current buffer as a maximum-quality JPEG
    pub fn encode_jpeg(&self) -> Result<Vec<u8>, VisionError> {
        self.image.encode_jpeg(JPEG_QUALITY)
    }
}
