// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::config::ComputeDevice;
use crate::version::{FEATURES, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub device: ComputeDevice,
    pub features: Vec<String>,
}

/// GET /health - liveness plus the device inference will run on
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        device: state.device,
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
    })
}
