// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Compute device selection for landmark inference

use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Device requested by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use CUDA when the runtime reports it, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

/// Device a model session actually runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    Cpu,
    Cuda,
}

impl ComputeDevice {
    /// Ask ONNX Runtime which accelerator is usable in this process.
    ///
    /// Called once at startup; the result is shared read-only by every request.
    pub fn probe() -> Self {
        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => {
                debug!("CUDA execution provider available");
                ComputeDevice::Cuda
            }
            Ok(false) => ComputeDevice::Cpu,
            Err(e) => {
                warn!("⚠️ Failed to query CUDA availability, using CPU: {}", e);
                ComputeDevice::Cpu
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeDevice::Cpu => "cpu",
            ComputeDevice::Cuda => "cuda",
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DevicePreference {
    /// Pick the device for a preference given what the process has available.
    ///
    /// An explicit CUDA request on a CPU-only host falls back to CPU.
    pub fn resolve(self, available: ComputeDevice) -> ComputeDevice {
        match (self, available) {
            (DevicePreference::Auto, device) => device,
            (DevicePreference::Cpu, _) => ComputeDevice::Cpu,
            (DevicePreference::Cuda, ComputeDevice::Cuda) => ComputeDevice::Cuda,
            (DevicePreference::Cuda, ComputeDevice::Cpu) => {
                warn!("CUDA requested but not available, falling back to CPU");
                ComputeDevice::Cpu
            }
        }
    }
}
