//! Notification routes. The relay mirrors the active notification and
//! forwards its copy / outside-click actions.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notification", get(current))
        .route("/notification/copy", post(copy))
        .route("/notification/dismiss", post(dismiss))
}

async fn current(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let center = state.notifications();
    Json(serde_json::json!({
        "notification": center.current(),
        "copyLabel": center.copy_label(),
    }))
}

async fn copy(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let center = state.notifications();
    match center.copy_link() {
        Ok(copied) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "copied": copied,
                "copyLabel": center.copy_label(),
            })),
        ),
        Err(e) => {
            warn!("Copy failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "copied": false, "error": e.to_string() })),
            )
        }
    }
}

async fn dismiss(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "dismissed": state.notifications().click_outside() }))
}
