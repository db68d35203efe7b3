// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use cephmark_server::{
    api::{start_server, AppState},
    config::{ComputeDevice, ServerConfig},
    version,
    vision::OnnxModelLoader,
};
use clap::Parser;
use std::{env, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let server_config = ServerConfig::parse();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);
    info!("✨ Features: {}", version::FEATURES.join(", "));

    let analysis_defaults = server_config
        .analysis_defaults()
        .context("Failed to load analysis defaults")?;
    analysis_defaults
        .validate()
        .context("Invalid analysis defaults")?;

    let device = ComputeDevice::probe();
    info!(
        "🧠 Compute device: {} (preference: {:?})",
        device, analysis_defaults.device
    );

    if !analysis_defaults.model_path.exists() {
        warn!(
            "⚠️ Landmark model not found at {}; /process will fail until it is present",
            analysis_defaults.model_path.display()
        );
    }

    let state = AppState::new(
        server_config,
        analysis_defaults,
        device,
        Arc::new(OnnxModelLoader),
    );

    info!("  Health:       GET  http://{}/health", state.server_config.bind_addr());
    info!("  Process:      POST http://{}/process (multipart field 'image')", state.server_config.bind_addr());

    start_server(state).await
}
