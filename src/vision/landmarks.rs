// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Landmark coordinates and marker drawing

use serde::{Deserialize, Serialize};

use super::image_utils::NormalizedImage;

/// A detected cephalometric landmark in original-image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Position in the model's landmark ordering
    pub index: usize,
    pub x: f32,
    pub y: f32,
    /// Peak response for heatmap models, 1.0 for regression models
    pub confidence: f32,
}

impl Landmark {
    pub fn new(index: usize, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            index,
            x,
            y,
            confidence,
        }
    }

    /// Nearest pixel, or `None` when the point falls outside `width`x`height`
    pub fn pixel(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        let (x, y) = (self.x.round(), self.y.round());
        if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
            return None;
        }
        Some((x as u32, y as u32))
    }
}

/// Fill a disc of `radius` pixels centered on the landmark.
///
/// Grayscale buffers receive the color's luma. Parts of the disc outside the
/// image are clipped; a landmark whose center is off-image draws nothing.
pub fn draw_marker(image: &mut NormalizedImage, landmark: &Landmark, radius: u32, color: [u8; 3]) {
    let (width, height) = (image.width(), image.height());
    let Some((cx, cy)) = landmark.pixel(width, height) else {
        return;
    };

    let rgb = color.map(|c| c as f32 / 255.0);
    let luma = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
    let channels = image.channels();
    let pixels = image.pixels_mut();

    let r = radius as i64;
    let (cx, cy) = (cx as i64, cy as i64);
    for y in (cy - r).max(0)..=(cy + r).min(height as i64 - 1) {
        for x in (cx - r).max(0)..=(cx + r).min(width as i64 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (row, col) = (y as usize, x as usize);
            if channels == 1 {
                pixels[[row, col, 0]] = luma;
            } else {
                for (c, value) in rgb.iter().enumerate() {
                    pixels[[row, col, c]] = *value;
                }
            }
        }
    }
}
