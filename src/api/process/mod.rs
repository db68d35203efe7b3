// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Landmark annotation endpoint module
//!
//! Provides POST /process: upload an image, get it back with landmarks drawn on it.

pub mod handler;
pub mod upload;

pub use handler::{annotate, process_handler, REQUEST_ID_HEADER};
pub use upload::{Upload, UPLOAD_FIELD};
