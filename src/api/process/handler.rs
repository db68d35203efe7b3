// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Landmark annotation endpoint handler

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::upload::Upload;
use crate::api::errors::ProcessError;
use crate::api::http_server::AppState;
use crate::config::AnalysisConfig;
use crate::vision::{CephImage, ModelLoader, VisionError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /process - Annotate cephalometric landmarks on an uploaded image
///
/// # Request
/// - multipart form with the file in the `image` field
///
/// # Response
/// - 200 with the annotated image as `image/jpeg` (quality 100, same dimensions)
/// - `x-request-id` header on every response
///
/// # Errors
/// All errors are `{"error": "<message>"}`:
/// - 400 Bad Request: no `image` field, or a broken multipart body
/// - 422 Unprocessable Entity: the upload is not a decodable image
/// - 500 Internal Server Error: staging, model loading, inference or encoding failed
pub async fn process_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("process", %request_id);

    async move {
        let mut response = match run(&state, request_id, multipart).await {
            Ok(jpeg) => {
                info!("✅ Sending annotated image ({} bytes)", jpeg.len());
                ([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response()
            }
            Err(e) => {
                if e.status_code().is_client_error() {
                    warn!(error_type = e.error_type(), "❌ {}", e);
                } else {
                    error!(error_type = e.error_type(), "❌ {}", e);
                }
                e.into_response()
            }
        };

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

async fn run(
    state: &AppState,
    request_id: Uuid,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>, ProcessError> {
    let multipart = multipart.map_err(|rejection| {
        debug!("Request body is not multipart: {}", rejection);
        ProcessError::MissingUpload
    })?;

    // 1. Receive
    let upload = Upload::from_multipart(multipart).await?;
    info!(
        "✅ File received: {:?} ({} bytes, {:?})",
        upload.file_name,
        upload.bytes.len(),
        upload.content_type
    );

    // 2. Stage
    let staged = state
        .stager
        .stage(request_id, upload.file_name.as_deref(), &upload.bytes)
        .await?;

    // 3. Configure
    let config = state
        .analysis_defaults
        .for_image(staged.path())
        .resolve_device(state.device);

    // 4-6. Load model, analyze, encode (blocking)
    let loader = Arc::clone(&state.model_loader);
    let span = Span::current();
    let jpeg = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let result = annotate(loader.as_ref(), &config);
        // Removed only once analysis is finished with it
        drop(staged);
        result
    })
    .await
    .map_err(|e| ProcessError::TaskFailed(e.to_string()))??;

    Ok(jpeg)
}

/// Load the model, analyze the configured image and encode the annotated result
pub fn annotate(loader: &dyn ModelLoader, config: &AnalysisConfig) -> Result<Vec<u8>, VisionError> {
    let image_path = config
        .image_src
        .as_deref()
        .ok_or_else(|| VisionError::Config("no image source configured".to_string()))?;

    let model = loader.load(config)?;

    let mut ceph = CephImage::open(image_path)?;
    ceph.process(model.as_ref(), config)?;
    info!("✅ Image processed");

    ceph.mark_landmarks(config);
    info!("✅ Landmarks marked");

    ceph.encode_jpeg()
}
