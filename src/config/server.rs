// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process configuration parsed from the command line and environment

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::analysis::AnalysisConfig;
use super::device::DevicePreference;
use super::ConfigError;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// cephmark server
#[derive(Parser, Debug, Clone)]
#[command(name = "cephmark-server")]
#[command(version)]
#[command(about = "Annotates cephalometric landmarks on uploaded images", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "CEPH_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "CEPH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory used to stage uploads while they are analyzed
    #[arg(long, env = "CEPH_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,

    /// TOML file overriding the built-in analysis defaults
    #[arg(long, env = "CEPH_ANALYSIS_CONFIG")]
    pub analysis_config: Option<PathBuf>,

    /// Landmark model weights (overrides the analysis config)
    #[arg(long, env = "CEPH_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Compute device preference (overrides the analysis config)
    #[arg(long, env = "CEPH_DEVICE", value_enum)]
    pub device: Option<DevicePreference>,

    /// Reject request bodies larger than this many bytes (unlimited when unset)
    #[arg(long, env = "CEPH_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            analysis_config: None,
            model_path: None,
            device: None,
            max_upload_bytes: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Build the analysis template: built-ins, then the TOML file, then CLI overrides.
    pub fn analysis_defaults(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = AnalysisConfig::load_defaults(self.analysis_config.as_deref())?;

        if let Some(ref model_path) = self.model_path {
            config.model_path = model_path.clone();
        }
        if let Some(device) = self.device {
            config.device = device;
        }

        Ok(config)
    }
}
