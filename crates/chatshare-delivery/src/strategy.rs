//! Delivery strategy seam and configuration-driven selection.

use std::sync::Arc;

use async_trait::async_trait;
use chatshare_core::{DeliveryMode, DeliveryOutcome, RenderedArtifact, Result, ShareConfig};

use crate::local::LocalDownload;
use crate::remote::RemoteShare;

/// How a rendered transcript reaches the user.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn mode(&self) -> DeliveryMode;

    /// Deliver `artifact` for the conversation open at `page_url`.
    async fn deliver(&self, artifact: &RenderedArtifact, page_url: &str)
        -> Result<DeliveryOutcome>;
}

/// Build the strategy selected by `config.delivery`.
pub fn build_strategy(config: &ShareConfig) -> Result<Arc<dyn DeliveryStrategy>> {
    let strategy: Arc<dyn DeliveryStrategy> = match config.delivery {
        DeliveryMode::Remote => Arc::new(RemoteShare::new(
            &config.share_endpoint,
            config.request_timeout(),
        )?),
        DeliveryMode::Local => Arc::new(LocalDownload::new(
            config.downloads_path(),
            &config.download_filename,
        )?),
    };
    Ok(strategy)
}
