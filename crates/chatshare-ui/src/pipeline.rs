//! Share pipeline: extract → render → deliver → notify.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chatshare_core::{
    Conversation, DeliveryMode, DeliveryOutcome, Error, HostSelectors, RenderedArtifact, Result,
};
use chatshare_delivery::{DeliveryStrategy, Notification, NotificationCenter, NotificationKind};
use chatshare_dom::DomReader;
use chatshare_export::{HtmlRenderer, MessageExtractor};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of one successful share.
#[derive(Debug, Clone, Serialize)]
pub struct ShareReport {
    #[serde(rename = "runId")]
    pub run_id: Uuid,
    pub outcome: DeliveryOutcome,
    pub notification: Notification,
    #[serde(rename = "messageCount")]
    pub message_count: usize,
    #[serde(rename = "completedAt")]
    pub completed_at: String,
}

pub struct SharePipeline {
    extractor: MessageExtractor,
    renderer: HtmlRenderer,
    strategy: Arc<dyn DeliveryStrategy>,
    notifications: Arc<NotificationCenter>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a run ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SharePipeline {
    pub fn new(
        selectors: &HostSelectors,
        strategy: Arc<dyn DeliveryStrategy>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            extractor: MessageExtractor::new(selectors),
            renderer: HtmlRenderer::new(),
            strategy,
            notifications,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub fn mode(&self) -> DeliveryMode {
        self.strategy.mode()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn extract<D: DomReader + ?Sized>(&self, dom: &D) -> Conversation {
        self.extractor.extract(dom)
    }

    pub fn render(&self, conversation: &Conversation) -> RenderedArtifact {
        self.renderer.render(conversation)
    }

    /// Share the conversation currently visible in `dom`.
    ///
    /// The DOM lock is only held while reading. A second call while one is
    /// still delivering fails with [`Error::Busy`] and shows nothing.
    pub async fn run<D>(&self, dom: &RwLock<D>, page_url: &str) -> Result<ShareReport>
    where
        D: DomReader + Send + Sync,
    {
        let _guard = self.begin()?;
        let conversation = {
            let dom = dom.read();
            self.extractor.extract(&*dom)
        };
        self.deliver(conversation, page_url).await
    }

    /// Share an already extracted conversation.
    pub async fn share(&self, conversation: Conversation, page_url: &str) -> Result<ShareReport> {
        let _guard = self.begin()?;
        self.deliver(conversation, page_url).await
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Share ignored: previous share still running");
            return Err(Error::Busy);
        }
        Ok(InFlight(&self.in_flight))
    }

    async fn deliver(&self, conversation: Conversation, page_url: &str) -> Result<ShareReport> {
        let run_id = Uuid::new_v4();
        let message_count = conversation.len();
        info!(
            "Share {} started: {} messages via {}",
            run_id,
            message_count,
            self.strategy.mode()
        );

        let artifact = self.renderer.render(&conversation);
        match self.strategy.deliver(&artifact, page_url).await {
            Ok(outcome) => {
                let notification = self
                    .notifications
                    .show(NotificationKind::from_outcome(&outcome));
                info!("Share {} completed", run_id);
                Ok(ShareReport {
                    run_id,
                    outcome,
                    notification,
                    message_count,
                    completed_at: chrono::Utc::now().to_rfc3339(),
                })
            }
            Err(e) => {
                warn!("Share {} failed: {}", run_id, e);
                self.notifications.show(NotificationKind::failure(&e));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use chatshare_delivery::{LocalDownload, MemoryClipboard, RemoteShare};
    use chatshare_dom::{ElementSpec, MemoryDom};
    use tokio::sync::Notify;

    fn notifications() -> Arc<NotificationCenter> {
        Arc::new(NotificationCenter::new(
            Duration::from_secs(5),
            Arc::new(MemoryClipboard::new()),
        ))
    }

    fn joke_page() -> RwLock<MemoryDom> {
        let mut dom = MemoryDom::new();
        let root = dom.root();
        for (class, text) in [
            ("font-user-message", "Hi"),
            ("font-claude-message", "Hello!"),
            ("font-claude-message", "Why did..."),
            ("font-user-message", "Tell me a joke"),
        ] {
            dom.append_child(root, ElementSpec::new("div").class(class).text(text))
                .unwrap();
        }
        RwLock::new(dom)
    }

    #[tokio::test]
    async fn test_remote_share_shows_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/store")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({ "id": "abc123" }),
            ))
            .with_status(200)
            .with_body(r#"{"val":"https://x/y"}"#)
            .expect(1)
            .create_async()
            .await;

        let strategy = Arc::new(
            RemoteShare::new(&format!("{}/store", server.url()), Duration::from_secs(5)).unwrap(),
        );
        let center = notifications();
        let pipeline = SharePipeline::new(&HostSelectors::default(), strategy, center.clone());

        let report = pipeline
            .run(&joke_page(), "https://claude.ai/chat/abc123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.message_count, 3);
        let expected = NotificationKind::ShareLink {
            url: "https://x/y".into(),
        };
        assert_eq!(report.notification.kind, expected);
        assert_eq!(center.current().unwrap().kind, expected);
        assert!(!pipeline.is_busy());
    }

    #[tokio::test]
    async fn test_local_download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = Arc::new(LocalDownload::new(dir.path(), "chat.html").unwrap());
        let pipeline = SharePipeline::new(&HostSelectors::default(), strategy, notifications());

        let report = pipeline.run(&joke_page(), "").await.unwrap();
        let html = std::fs::read_to_string(dir.path().join("chat.html")).unwrap();
        assert!(html.contains("Why did..."));
        assert!(!html.contains("Tell me a joke"));
        assert!(matches!(report.notification.kind, NotificationKind::Saved { .. }));
    }

    #[tokio::test]
    async fn test_failure_becomes_notification() {
        let strategy =
            Arc::new(RemoteShare::new("http://127.0.0.1:1/store", Duration::from_secs(2)).unwrap());
        let center = notifications();
        let pipeline = SharePipeline::new(&HostSelectors::default(), strategy, center.clone());

        let err = pipeline
            .run(&joke_page(), "https://claude.ai/chat/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(matches!(
            center.current().unwrap().kind,
            NotificationKind::Failure { .. }
        ));
        assert!(!pipeline.is_busy());
    }

    struct GatedStrategy {
        gate: Notify,
    }

    #[async_trait]
    impl DeliveryStrategy for GatedStrategy {
        fn mode(&self) -> DeliveryMode {
            DeliveryMode::Remote
        }

        async fn deliver(
            &self,
            _artifact: &RenderedArtifact,
            _page_url: &str,
        ) -> Result<DeliveryOutcome> {
            self.gate.notified().await;
            Ok(DeliveryOutcome::Shared {
                url: "https://x/gated".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_double_click_rejected() {
        let strategy = Arc::new(GatedStrategy { gate: Notify::new() });
        let pipeline = Arc::new(SharePipeline::new(
            &HostSelectors::default(),
            strategy.clone(),
            notifications(),
        ));
        let page = Arc::new(joke_page());

        let first = {
            let pipeline = pipeline.clone();
            let page = page.clone();
            tokio::spawn(async move { pipeline.run(&*page, "https://claude.ai/chat/a").await })
        };
        while !pipeline.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = pipeline.run(&*page, "https://claude.ai/chat/a").await;
        assert!(matches!(second, Err(Error::Busy)));

        strategy.gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(!pipeline.is_busy());
    }
}
