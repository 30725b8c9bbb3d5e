//! Health and configuration routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chatshare_core::ShareConfig;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "delivery": state.pipeline.mode(),
        "busy": state.pipeline.is_busy(),
    }))
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<ShareConfig> {
    Json(state.config.clone())
}
