//! Local download: write the transcript to a fixed file name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chatshare_core::{DeliveryMode, DeliveryOutcome, Error, RenderedArtifact, Result};
use tracing::info;

use crate::strategy::DeliveryStrategy;

pub struct LocalDownload {
    dir: PathBuf,
    filename: String,
}

impl LocalDownload {
    pub fn new(dir: impl Into<PathBuf>, filename: &str) -> Result<Self> {
        if filename.is_empty()
            || filename.contains(|c| c == '/' || c == '\\')
            || filename == "."
            || filename == ".."
        {
            return Err(Error::Config(format!("Invalid download filename: {}", filename)));
        }
        Ok(Self {
            dir: dir.into(),
            filename: filename.to_string(),
        })
    }

    pub fn target_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    fn write(&self, path: &Path, artifact: &RenderedArtifact) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, artifact.html())?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryStrategy for LocalDownload {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Local
    }

    async fn deliver(
        &self,
        artifact: &RenderedArtifact,
        _page_url: &str,
    ) -> Result<DeliveryOutcome> {
        let path = self.target_path();
        self.write(&path, artifact)?;
        info!(
            "Saved {} ({}) to {}",
            self.filename,
            artifact.content_type(),
            path.display()
        );
        Ok(DeliveryOutcome::Saved { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_saves_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloads");
        let local = LocalDownload::new(&downloads, "claude-conversation.html").unwrap();
        let artifact = RenderedArtifact::new("<html></html>".into());

        let outcome = local.deliver(&artifact, "ignored").await.unwrap();
        let expected = downloads.join("claude-conversation.html");
        assert_eq!(outcome, DeliveryOutcome::Saved { path: expected.clone() });
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn test_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalDownload::new(dir.path(), "chat.html").unwrap();
        local
            .deliver(&RenderedArtifact::new("old".into()), "")
            .await
            .unwrap();
        local
            .deliver(&RenderedArtifact::new("new".into()), "")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("chat.html")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_rejects_paths() {
        assert!(LocalDownload::new("/tmp", "a/b.html").is_err());
        assert!(LocalDownload::new("/tmp", "").is_err());
        assert!(LocalDownload::new("/tmp", "..").is_err());
    }
}
