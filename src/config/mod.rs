// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process and per-request configuration
//!
//! - `server` - bind address, upload directory and overrides parsed from CLI/env
//! - `analysis` - the landmark analysis template cloned for every request
//! - `device` - compute device preference and probing

pub mod analysis;
pub mod device;
pub mod server;

use std::path::PathBuf;
use thiserror::Error;

pub use analysis::AnalysisConfig;
pub use device::{ComputeDevice, DevicePreference};
pub use server::ServerConfig;

/// Errors raised while building configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid analysis config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}
