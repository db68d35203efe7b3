// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading, normalized pixel buffers and JPEG encoding

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use ndarray::{Array2, Array3, Axis};
use std::path::Path;

use super::error::VisionError;

/// JPEG quality used for annotated output
pub const JPEG_QUALITY: u8 = 100;

/// Pixel buffer with intensities normalized to [0, 1].
///
/// Shape is (height, width, channels) with 1 (grayscale) or 3 (RGB) channels.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pixels: Array3<f32>,
}

impl NormalizedImage {
    pub fn new(pixels: Array3<f32>) -> Result<Self, VisionError> {
        let (height, width, channels) = pixels.dim();
        if height == 0 || width == 0 {
            return Err(VisionError::InvalidBuffer(format!(
                "empty buffer {}x{}",
                width, height
            )));
        }
        if channels != 1 && channels != 3 {
            return Err(VisionError::InvalidBuffer(format!(
                "expected 1 or 3 channels, got {}",
                channels
            )));
        }
        Ok(Self { pixels })
    }

    /// Wrap a 2-D (height, width) grayscale array
    pub fn from_gray(pixels: Array2<f32>) -> Result<Self, VisionError> {
        Self::new(pixels.insert_axis(Axis(2)))
    }

    /// Normalize a decoded image into an RGB buffer
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
            rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    pub fn pixels(&self) -> &Array3<f32> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Array3<f32> {
        &mut self.pixels
    }

    /// Rescale to 8-bit samples in row-major, channel-interleaved order
    pub fn to_u8(&self) -> Vec<u8> {
        self.pixels.iter().copied().map(rescale_to_u8).collect()
    }

    pub fn to_dynamic(&self) -> Result<DynamicImage, VisionError> {
        let (width, height) = (self.width(), self.height());
        let samples = self.to_u8();

        let image = match self.channels() {
            1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
            _ => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        };

        image.ok_or_else(|| {
            VisionError::InvalidBuffer(format!(
                "sample count does not match {}x{}x{}",
                width,
                height,
                self.channels()
            ))
        })
    }

    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, VisionError> {
        encode_jpeg(&self.to_dynamic()?, quality)
    }
}

/// Map a normalized intensity to 8 bits: clamp to [0, 1], scale by 255, round.
///
/// NaN maps to 0.
pub fn rescale_to_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Encode an image as JPEG into memory
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, VisionError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|e| VisionError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Read and decode an image file, detecting the format from its content
pub fn load_image_file(path: &Path) -> Result<DynamicImage, VisionError> {
    let bytes = std::fs::read(path)
        .map_err(|e| VisionError::ImageDecode(format!("failed to read image: {}", e)))?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes (staged multipart uploads)
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, VisionError> {
    if bytes.is_empty() {
        return Err(VisionError::ImageDecode("image data is empty".to_string()));
    }

    let format = detect_format(bytes)?;

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| VisionError::ImageDecode(e.to_string()))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, VisionError> {
    if bytes.len() < 4 {
        return Err(VisionError::ImageDecode("unsupported image format".to_string()));
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(VisionError::ImageDecode("unsupported image format".to_string())),
    }
}
