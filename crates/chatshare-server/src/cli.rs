//! One-shot commands that work on a snapshot file instead of a live relay.

use std::path::Path;
use std::sync::Arc;

use chatshare_core::ShareConfig;
use chatshare_delivery::{
    build_strategy, Notification, NotificationKind, Notifier, SystemClipboard,
};
use chatshare_dom::MemoryDom;
use parking_lot::RwLock;

use crate::state::AppState;

/// Prints notifications for terminal use.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notification: &Notification) {
        match &notification.kind {
            NotificationKind::ShareLink { url } => println!("Share link: {}", url),
            NotificationKind::Saved { path } => println!("Saved: {}", path.display()),
            NotificationKind::Failure { message } => eprintln!("Share failed: {}", message),
        }
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<MemoryDom> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok(MemoryDom::from_json(&json)?)
}

/// Extract, render and deliver a snapshot with the configured strategy.
pub async fn export(
    config: ShareConfig,
    snapshot: &Path,
    page_url: &str,
    copy: bool,
) -> anyhow::Result<()> {
    let dom = RwLock::new(load_snapshot(snapshot)?);
    let strategy = build_strategy(&config)?;
    let state = AppState::with_strategy(
        config,
        strategy,
        Arc::new(SystemClipboard),
        vec![Arc::new(PrintNotifier)],
    );

    let report = state.pipeline.run(&dom, page_url).await?;
    println!("{} messages exported", report.message_count);

    if copy {
        if state.notifications().copy_link()? {
            println!("Link copied to clipboard");
        } else {
            println!("Nothing to copy");
        }
    }
    Ok(())
}

/// Render a snapshot to HTML without delivering it.
pub fn render(config: &ShareConfig, snapshot: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let dom = load_snapshot(snapshot)?;
    let conversation = chatshare_export::MessageExtractor::new(&config.selectors).extract(&dom);
    let artifact = chatshare_export::HtmlRenderer::new().render(&conversation);

    match out {
        Some(path) => {
            std::fs::write(path, artifact.html())?;
            eprintln!(
                "Rendered {} messages to {}",
                conversation.len(),
                path.display()
            );
        }
        None => print!("{}", artifact.html()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatshare_core::DeliveryMode;

    const SNAPSHOT: &str = r#"{
        "tag": "body",
        "children": [
            { "tag": "div", "classes": ["font-user-message"], "text": "Hi" },
            { "tag": "div", "classes": ["font-claude-message"], "text": "Hello!" },
            { "tag": "div", "classes": ["font-user-message"], "text": "draft" }
        ]
    }"#;

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("page.json");
        std::fs::write(&snapshot, SNAPSHOT).unwrap();
        let out = dir.path().join("out.html");

        render(&ShareConfig::default(), &snapshot, Some(&out)).unwrap();
        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.contains("Hello!"));
        assert!(!html.contains("draft"));
    }

    #[tokio::test]
    async fn test_export_local() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("page.json");
        std::fs::write(&snapshot, SNAPSHOT).unwrap();
        let config = ShareConfig {
            delivery: DeliveryMode::Local,
            downloads_dir: Some(dir.path().join("downloads")),
            ..ShareConfig::default()
        };

        export(config, &snapshot, "https://claude.ai/chat/abc", false)
            .await
            .unwrap();
        assert!(dir
            .path()
            .join("downloads")
            .join("claude-conversation.html")
            .exists());
    }

    #[test]
    fn test_missing_snapshot() {
        let err = render(&ShareConfig::default(), Path::new("/nonexistent/page.json"), None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
