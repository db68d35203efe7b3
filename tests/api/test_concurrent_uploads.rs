// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// tests/api/test_concurrent_uploads.rs
//! Overlapping requests must each see only their own upload

use super::support::*;
use axum::http::StatusCode;
use cephmark_server::api::{create_app, AppState};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SIZE: u32 = 64;
const DOT_A: (u32, u32) = (12, 12);
const DOT_B: (u32, u32) = (50, 48);

fn is_red(pixel: [u8; 3]) -> bool {
    pixel[0] > 180 && pixel[1] < 80 && pixel[2] < 80
}

fn is_dark(pixel: [u8; 3]) -> bool {
    pixel.iter().all(|&c| c < 60)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_distinct_uploads_are_isolated() {
    let dir = TempDir::new().unwrap();
    let loader = RecordingLoader::default();
    let app = create_app(AppState::new_for_test(dir.path(), Arc::new(loader.clone())));

    let (a, b) = tokio::join!(
        app.clone()
            .oneshot(image_upload("a.png", &png_with_dot(SIZE, SIZE, DOT_A))),
        app.clone()
            .oneshot(image_upload("b.png", &png_with_dot(SIZE, SIZE, DOT_B))),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    let a = image::load_from_memory(&body_bytes(a).await).unwrap().to_rgb8();
    let b = image::load_from_memory(&body_bytes(b).await).unwrap().to_rgb8();

    assert!(is_red(a.get_pixel(DOT_A.0, DOT_A.1).0));
    assert!(is_dark(a.get_pixel(DOT_B.0, DOT_B.1).0));
    assert!(is_red(b.get_pixel(DOT_B.0, DOT_B.1).0));
    assert!(is_dark(b.get_pixel(DOT_A.0, DOT_A.1).0));

    assert_eq!(loader.image_sources().len(), 2);
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_same_filename_gets_distinct_staging_paths() {
    let dir = TempDir::new().unwrap();
    let loader = RecordingLoader::default();
    let app = create_app(AppState::new_for_test(dir.path(), Arc::new(loader.clone())));

    let (a, b) = tokio::join!(
        app.clone()
            .oneshot(image_upload("ceph.png", &png_with_dot(SIZE, SIZE, DOT_A))),
        app.clone()
            .oneshot(image_upload("ceph.png", &png_with_dot(SIZE, SIZE, DOT_B))),
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);

    let sources = loader.image_sources();
    let unique: HashSet<_> = sources.iter().collect();
    assert_eq!(sources.len(), 2);
    assert_eq!(unique.len(), 2);
    assert!(sources
        .iter()
        .all(|p| p.to_str().unwrap().ends_with("-ceph.png")));
    assert!(dir_entries(dir.path()).is_empty());
}
