// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum_extra::extract::Multipart;
use bytes::Bytes;

use crate::api::errors::ProcessError;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "image";

/// One uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied filename (untrusted)
    pub file_name: Option<String>,
    /// Declared MIME type (not validated)
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Read fields until the `image` field is found.
    ///
    /// Other fields are skipped. Size and MIME type are not checked here.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ProcessError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ProcessError::InvalidMultipart(e.to_string()))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }

            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ProcessError::InvalidMultipart(e.to_string()))?;

            return Ok(Self {
                file_name,
                content_type,
                bytes,
            });
        }

        Err(ProcessError::MissingUpload)
    }
}
