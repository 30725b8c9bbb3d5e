//! Remote share: upload the transcript and return the link the store hands back.

use std::time::Duration;

use async_trait::async_trait;
use chatshare_core::{
    conversation_id_from_url, DeliveryMode, DeliveryOutcome, Error, RenderedArtifact, Result,
    ShareRecord,
};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::strategy::DeliveryStrategy;

pub struct RemoteShare {
    client: Client,
    endpoint: String,
}

impl RemoteShare {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl DeliveryStrategy for RemoteShare {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Remote
    }

    async fn deliver(
        &self,
        artifact: &RenderedArtifact,
        page_url: &str,
    ) -> Result<DeliveryOutcome> {
        let id = conversation_id_from_url(page_url);
        let record = ShareRecord {
            html: artifact.html(),
            id: &id,
        };

        debug!("Posting {} bytes for {} to {}", artifact.html().len(), id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&record)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Share endpoint returned {}", status);
            return Err(Error::Network(format!("Share endpoint returned {}: {}", status, body)));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("Response is not JSON: {}", e)))?;
        let url = value
            .get("val")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MalformedResponse("Response has no `val` string".into()))?;

        info!("Shared conversation {} at {}", id, url);
        Ok(DeliveryOutcome::Shared {
            url: url.to_string(),
        })
    }
}
