// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod staging;

pub use staging::{sanitize_filename, StagedFile, StagingError, UploadStager, DEFAULT_FILENAME};
