// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Seams between the request pipeline and the landmark model

use image::DynamicImage;

use super::error::VisionError;
use super::landmarks::Landmark;
use crate::config::AnalysisConfig;

/// A loaded, invocable landmark model
#[cfg_attr(test, mockall::automock)]
pub trait LandmarkModel: Send + Sync {
    /// Predict landmarks in `image` pixel coordinates
    fn predict(
        &self,
        image: &DynamicImage,
        config: &AnalysisConfig,
    ) -> Result<Vec<Landmark>, VisionError>;
}

/// Builds a model from a request configuration.
///
/// Loading may be slow (weights, session setup) and runs on a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait ModelLoader: Send + Sync {
    fn load(&self, config: &AnalysisConfig) -> Result<Box<dyn LandmarkModel>, VisionError>;
}
