// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// tests/vision_pipeline/test_annotation.rs
//! End-to-end annotation of files on disk without the HTTP layer

use cephmark_server::api::process::annotate;
use cephmark_server::config::AnalysisConfig;
use cephmark_server::vision::{
    CephImage, Landmark, LandmarkModel, ModelLoader, NormalizedImage, VisionError,
};
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::Array3;
use std::path::{Path, PathBuf};

struct FixedLandmarks(Vec<Landmark>);

impl LandmarkModel for FixedLandmarks {
    fn predict(
        &self,
        _image: &DynamicImage,
        _config: &AnalysisConfig,
    ) -> Result<Vec<Landmark>, VisionError> {
        Ok(self.0.clone())
    }
}

struct FixedLoader(Vec<Landmark>);

impl ModelLoader for FixedLoader {
    fn load(&self, _config: &AnalysisConfig) -> Result<Box<dyn LandmarkModel>, VisionError> {
        Ok(Box::new(FixedLandmarks(self.0.clone())))
    }
}

fn save(dir: &Path, name: &str, image: DynamicImage, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    image.save_with_format(&path, format).unwrap();
    path
}

#[test]
fn test_annotate_rgb_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = save(
        dir.path(),
        "ceph.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 0]))),
        ImageFormat::Png,
    );
    let config = AnalysisConfig::default().for_image(&path);
    let loader = FixedLoader(vec![Landmark::new(0, 10.0, 15.0, 0.9)]);

    let jpeg = annotate(&loader, &config).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();

    assert_eq!(decoded.dimensions(), (40, 30));
    let marker = decoded.to_rgb8().get_pixel(10, 15).0;
    assert!(marker[0] > 180 && marker[1] < 80, "{marker:?}");
    let background = decoded.to_rgb8().get_pixel(35, 3).0;
    assert!(background.iter().all(|&c| c < 30), "{background:?}");
}

#[test]
fn test_annotate_grayscale_keeps_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = save(
        dir.path(),
        "xray.png",
        DynamicImage::ImageLuma8(GrayImage::from_pixel(25, 17, Luma([90]))),
        ImageFormat::Png,
    );
    let config = AnalysisConfig::default().for_image(&path);

    let jpeg = annotate(&FixedLoader(Vec::new()), &config).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (25, 17));
}

#[test]
fn test_landmarks_outside_image_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = save(
        dir.path(),
        "ceph.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]))),
        ImageFormat::Png,
    );
    let config = AnalysisConfig::default().for_image(&path);
    let loader = FixedLoader(vec![
        Landmark::new(0, -50.0, 5.0, 1.0),
        Landmark::new(1, 500.0, 500.0, 1.0),
    ]);

    let jpeg = annotate(&loader, &config).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 30)));
}

#[test]
fn test_ceph_image_reports_landmarks() {
    let dir = tempfile::tempdir().unwrap();
    let path = save(
        dir.path(),
        "ceph.jpg",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([128, 128, 128]))),
        ImageFormat::Jpeg,
    );
    let config = AnalysisConfig {
        num_landmarks: 2,
        ..AnalysisConfig::default()
    }
    .for_image(&path);
    let model = FixedLandmarks(vec![
        Landmark::new(0, 4.0, 4.0, 0.5),
        Landmark::new(1, 28.0, 28.0, 0.7),
    ]);

    let mut ceph = CephImage::open(&path).unwrap();
    let found = ceph.process(&model, &config).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].index, 1);
}

#[test]
fn test_unit_range_buffers_encode_to_extremes() {
    let white = NormalizedImage::new(Array3::from_elem((6, 8, 3), 1.0)).unwrap();
    let black = NormalizedImage::new(Array3::from_elem((6, 8, 3), 0.0)).unwrap();

    let white = image::load_from_memory(&white.encode_jpeg(100).unwrap())
        .unwrap()
        .to_rgb8();
    let black = image::load_from_memory(&black.encode_jpeg(100).unwrap())
        .unwrap()
        .to_rgb8();

    assert!(white.pixels().all(|p| p.0.iter().all(|&c| c >= 250)));
    assert!(black.pixels().all(|p| p.0.iter().all(|&c| c <= 5)));
    assert_eq!(white.dimensions(), (8, 6));
}
