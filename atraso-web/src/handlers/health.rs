//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use atraso_core::model::ModelMetadata;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: i64,
    model: ModelMetadata,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.metadata.clone(),
    })
}
