//! HTTP route handlers for the browser relay.

pub mod notification;
pub mod share;
pub mod status;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes(state.config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(share::routes(body_limit))
        .merge(notification::routes())
}
