// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StagingError;
use crate::vision::VisionError;

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Everything that can end a `/process` request early
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No file uploaded")]
    MissingUpload,

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

impl ProcessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProcessError::MissingUpload | ProcessError::InvalidMultipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ProcessError::Vision(VisionError::ImageDecode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ProcessError::Staging(_) | ProcessError::Vision(_) | ProcessError::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable label for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            ProcessError::MissingUpload => "missing_upload",
            ProcessError::InvalidMultipart(_) => "invalid_multipart",
            ProcessError::Staging(_) => "staging_error",
            ProcessError::Vision(VisionError::ModelLoad(_)) => "model_load_error",
            ProcessError::Vision(VisionError::ImageDecode(_)) => "image_decode_error",
            ProcessError::Vision(VisionError::Inference(_)) => "inference_error",
            ProcessError::Vision(VisionError::Encode(_))
            | ProcessError::Vision(VisionError::InvalidBuffer(_)) => "encode_error",
            ProcessError::Vision(VisionError::Config(_)) => "config_error",
            ProcessError::TaskFailed(_) => "task_failed",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
