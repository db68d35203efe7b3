// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the landmark model

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Preprocess an image for landmark inference
///
/// Steps:
/// 1. Resize (without preserving aspect ratio) to `width`x`height`
/// 2. Convert to RGB
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_landmarks(image: &DynamicImage, width: u32, height: u32) -> Array4<f32> {
    let resized = image.resize_exact(width, height, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
