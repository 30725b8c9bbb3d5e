//! Share routes. The relay posts a DOM snapshot taken when the user clicked
//! the share control.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::post;
use axum::{Json, Router};
use chatshare_core::{Conversation, Error};
use chatshare_dom::{MemoryDom, SnapshotNode};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::info;

use crate::state::AppState;

/// Snapshot routes. `body_limit` replaces axum's default request body cap.
pub fn routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/share", post(share))
        .route("/extract", post(extract))
        .route("/render", post(render))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Either a page snapshot or a conversation the caller already extracted.
#[derive(Debug, Deserialize)]
struct ShareBody {
    #[serde(rename = "pageUrl", default)]
    page_url: String,
    #[serde(default)]
    snapshot: Option<SnapshotNode>,
    #[serde(default)]
    conversation: Option<Conversation>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBody {
    snapshot: SnapshotNode,
}

fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Busy => StatusCode::CONFLICT,
        e if e.is_delivery() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn share(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShareBody>,
) -> (StatusCode, Json<serde_json::Value>) {
    info!("Share requested for {}", body.page_url);
    let result = match (body.conversation, body.snapshot) {
        (Some(conversation), _) => state.pipeline.share(conversation, &body.page_url).await,
        (None, Some(snapshot)) => {
            let dom = RwLock::new(MemoryDom::from_snapshot(&snapshot));
            state.pipeline.run(&dom, &body.page_url).await
        }
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Request needs a snapshot or a conversation",
                })),
            );
        }
    };

    match result {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "runId": report.run_id,
                "outcome": report.outcome,
                "notification": report.notification,
                "messageCount": report.message_count,
                "completedAt": report.completed_at,
            })),
        ),
        Err(e) => (
            error_status(&e),
            Json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
                "notification": state.notifications().current(),
            })),
        ),
    }
}

async fn extract(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SnapshotBody>,
) -> Json<Conversation> {
    let dom = MemoryDom::from_snapshot(&body.snapshot);
    Json(state.pipeline.extract(&dom))
}

async fn render(State(state): State<Arc<AppState>>, Json(body): Json<SnapshotBody>) -> Html<String> {
    let dom = MemoryDom::from_snapshot(&body.snapshot);
    let conversation = state.pipeline.extract(&dom);
    Html(state.pipeline.render(&conversation).into_html())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use chatshare_core::ShareConfig;
    use chatshare_delivery::{LocalDownload, MemoryClipboard, RemoteShare};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;

    fn snapshot() -> serde_json::Value {
        serde_json::json!({
            "tag": "body",
            "children": [
                { "tag": "div", "classes": ["font-user-message"], "text": "Hi" },
                { "tag": "div", "classes": ["font-claude-message"], "text": "Hello <b>!" },
                { "tag": "div", "classes": ["font-user-message"], "text": "Tell me a joke" }
            ]
        })
    }

    fn local_state(dir: &std::path::Path) -> Arc<AppState> {
        let strategy = Arc::new(LocalDownload::new(dir, "chat.html").unwrap());
        Arc::new(AppState::with_strategy(
            ShareConfig::default(),
            strategy,
            Arc::new(MemoryClipboard::new()),
            Vec::new(),
        ))
    }

    async fn post_json(
        state: Arc<AppState>,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, String) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_share_local() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            local_state(dir.path()),
            "/api/share",
            serde_json::json!({ "pageUrl": "https://claude.ai/chat/abc123", "snapshot": snapshot() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["messageCount"], 2);
        assert_eq!(json["outcome"]["kind"], "saved");
        assert_eq!(json["notification"]["kind"], "saved");
        assert!(dir.path().join("chat.html").exists());
    }

    #[tokio::test]
    async fn test_share_remote_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/store")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let strategy = Arc::new(
            RemoteShare::new(&format!("{}/store", server.url()), Duration::from_secs(5)).unwrap(),
        );
        let state = Arc::new(AppState::with_strategy(
            ShareConfig::default(),
            strategy,
            Arc::new(MemoryClipboard::new()),
            Vec::new(),
        ));

        let (status, body) = post_json(
            state,
            "/api/share",
            serde_json::json!({ "pageUrl": "https://claude.ai/chat/abc123", "snapshot": snapshot() }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["notification"]["kind"], "failure");
    }

    #[tokio::test]
    async fn test_share_extracted_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            local_state(dir.path()),
            "/api/share",
            serde_json::json!({
                "pageUrl": "https://claude.ai/chat/abc123",
                "conversation": [
                    { "role": "human", "content": "Hi" },
                    { "role": "assistant", "content": "Hello!" },
                    { "role": "assistant", "content": "Why did..." }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["messageCount"], 3);
        let html = std::fs::read_to_string(dir.path().join("chat.html")).unwrap();
        assert!(html.contains("Why did..."));
    }

    #[tokio::test]
    async fn test_share_without_content_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = post_json(
            local_state(dir.path()),
            "/api/share",
            serde_json::json!({ "pageUrl": "https://claude.ai/chat/abc123" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("chat.html").exists());
    }

    fn long_snapshot(bytes: usize) -> serde_json::Value {
        serde_json::json!({
            "tag": "body",
            "children": [
                { "tag": "div", "classes": ["font-user-message"], "text": "Summarize this" },
                { "tag": "div", "classes": ["font-claude-message"], "text": "a".repeat(bytes) },
                { "tag": "div", "classes": ["font-user-message"], "text": "draft" }
            ]
        })
    }

    #[tokio::test]
    async fn test_share_snapshot_over_axum_default_limit() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            local_state(dir.path()),
            "/api/share",
            serde_json::json!({
                "pageUrl": "https://claude.ai/chat/abc123",
                "snapshot": long_snapshot(3 * 1024 * 1024),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["messageCount"], 2);
        let saved = std::fs::metadata(dir.path().join("chat.html")).unwrap();
        assert!(saved.len() > 3 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_body_limit_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShareConfig {
            max_body_bytes: 1024,
            ..ShareConfig::default()
        };
        let state = Arc::new(AppState::with_strategy(
            config,
            Arc::new(LocalDownload::new(dir.path(), "chat.html").unwrap()),
            Arc::new(MemoryClipboard::new()),
            Vec::new(),
        ));

        let (status, _) = post_json(
            state,
            "/api/render",
            serde_json::json!({ "snapshot": long_snapshot(4096) }),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_extract_route() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            local_state(dir.path()),
            "/api/extract",
            serde_json::json!({ "snapshot": snapshot() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "role": "human", "content": "Hi" },
                { "role": "assistant", "content": "Hello <b>!" }
            ])
        );
    }

    #[tokio::test]
    async fn test_render_route_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            local_state(dir.path()),
            "/api/render",
            serde_json::json!({ "snapshot": snapshot() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello &lt;b&gt;!"));
        assert!(!body.contains("Tell me a joke"));
        assert!(!dir.path().join("chat.html").exists());
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&Error::Busy), StatusCode::CONFLICT);
        assert_eq!(
            error_status(&Error::Network("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&Error::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
