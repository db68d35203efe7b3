// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::health_handler;
use super::process::process_handler;
use crate::config::{AnalysisConfig, ComputeDevice, ServerConfig};
use crate::storage::UploadStager;
use crate::vision::ModelLoader;

/// Immutable process-wide state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub server_config: Arc<ServerConfig>,
    /// Template cloned into each request's configuration
    pub analysis_defaults: Arc<AnalysisConfig>,
    /// Device probed at startup
    pub device: ComputeDevice,
    pub stager: UploadStager,
    pub model_loader: Arc<dyn ModelLoader>,
}

impl AppState {
    pub fn new(
        server_config: ServerConfig,
        analysis_defaults: AnalysisConfig,
        device: ComputeDevice,
        model_loader: Arc<dyn ModelLoader>,
    ) -> Self {
        let stager = UploadStager::new(&server_config.upload_dir);
        Self {
            server_config: Arc::new(server_config),
            analysis_defaults: Arc::new(analysis_defaults),
            device,
            stager,
            model_loader,
        }
    }

    /// CPU device and built-in analysis defaults, staging under `upload_dir`
    pub fn new_for_test(upload_dir: impl Into<PathBuf>, model_loader: Arc<dyn ModelLoader>) -> Self {
        let server_config = ServerConfig {
            upload_dir: upload_dir.into(),
            ..Default::default()
        };
        Self::new(
            server_config,
            AnalysisConfig::default(),
            ComputeDevice::Cpu,
            model_loader,
        )
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = match state.server_config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/process", post(process_handler))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    state.stager.ensure_root()?;
    info!("📁 Staging uploads in {}", state.stager.root().display());

    let addr = state.server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
