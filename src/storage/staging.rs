// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transient staging of uploaded files
//!
//! Every staged file lives directly under the upload directory as
//! `<request_id>-<sanitized name>` and is removed when its [`StagedFile`]
//! guard is dropped.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Name used when nothing safe is left of the client's filename
pub const DEFAULT_FILENAME: &str = "upload";

/// Longest sanitized name kept, in bytes
const MAX_FILENAME_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create upload directory: {0}")]
    CreateDir(#[source] io::Error),

    #[error("Failed to stage upload: {0}")]
    Write(#[source] io::Error),
}

/// Reduce a client-supplied filename to a single safe path component.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped, and leading/trailing `.`/`_` are trimmed,
/// so `../../etc/passwd` becomes `etc_passwd`. Falls back to
/// [`DEFAULT_FILENAME`] when the result is empty.
pub fn sanitize_filename(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let mut name = filtered
        .trim_matches(|c| c == '.' || c == '_')
        .to_string();

    // ASCII only at this point, so byte truncation is char-safe
    if name.len() > MAX_FILENAME_LEN {
        name.truncate(MAX_FILENAME_LEN);
    }

    if name.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        name
    }
}

/// Writes uploads into the shared upload directory under per-request names
#[derive(Debug, Clone)]
pub struct UploadStager {
    root: PathBuf,
}

impl UploadStager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist
    pub fn ensure_root(&self) -> Result<(), StagingError> {
        std::fs::create_dir_all(&self.root).map_err(StagingError::CreateDir)
    }

    /// Path a request's upload is staged at
    pub fn staged_path(&self, request_id: Uuid, original_name: Option<&str>) -> PathBuf {
        let name = sanitize_filename(original_name.unwrap_or_default());
        self.root
            .join(format!("{}-{}", request_id.as_simple(), name))
    }

    /// Write `bytes` to a fresh staging file owned by the returned guard.
    ///
    /// Never overwrites: an existing file at the target path is an error.
    pub async fn stage(
        &self,
        request_id: Uuid,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StagedFile, StagingError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StagingError::CreateDir)?;

        let path = self.staged_path(request_id, original_name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(StagingError::Write)?;

        // Guard first so a failed write still removes the partial file
        let staged = StagedFile { path };

        file.write_all(bytes).await.map_err(StagingError::Write)?;
        file.flush().await.map_err(StagingError::Write)?;

        debug!(
            "Staged {} bytes at {}",
            bytes.len(),
            staged.path.display()
        );
        Ok(staged)
    }
}

/// A staged upload, deleted from disk when dropped
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "⚠️ Failed to remove staged file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
