// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// tests/api/test_cors.rs
//! Cross-origin access to the annotation endpoint

use super::support::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cephmark_server::api::{create_app, AppState};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const ORIGIN: &str = "https://example.com";

#[tokio::test]
async fn test_cors_headers_on_process() {
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new_for_test(
        dir.path(),
        Arc::new(RecordingLoader::default()),
    ));

    let mut request = image_upload("ceph.png", &png_with_dot(8, 8, (3, 3)));
    request
        .headers_mut()
        .insert("origin", ORIGIN.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_cors_headers_on_error_response() {
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new_for_test(
        dir.path(),
        Arc::new(RecordingLoader::default()),
    ));

    let body = multipart_body("file", "ceph.png", "image/png", b"x");
    let mut request = process_request(body);
    request
        .headers_mut()
        .insert("origin", ORIGIN.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_cors_preflight() {
    let dir = TempDir::new().unwrap();
    let loader = RecordingLoader::default();
    let app = create_app(AppState::new_for_test(dir.path(), Arc::new(loader.clone())));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/process")
        .header("origin", ORIGIN)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-methods"));
    assert!(headers.contains_key("access-control-allow-headers"));

    // Preflight never reaches the handler
    assert!(loader.image_sources().is_empty());
    assert!(dir_entries(dir.path()).is_empty());
}
