//! Shared application state.

use std::sync::Arc;

use chatshare_core::{Result, ShareConfig};
use chatshare_delivery::{
    build_strategy, Clipboard, DeliveryStrategy, NotificationCenter, Notifier, TracingNotifier,
};
use chatshare_ui::SharePipeline;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ShareConfig,
    pub pipeline: Arc<SharePipeline>,
}

impl AppState {
    /// Build state with the strategy selected by `config`.
    pub fn new(config: ShareConfig, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let strategy = build_strategy(&config)?;
        Ok(Self::with_strategy(config, strategy, clipboard, Vec::new()))
    }

    pub fn with_strategy(
        config: ShareConfig,
        strategy: Arc<dyn DeliveryStrategy>,
        clipboard: Arc<dyn Clipboard>,
        extra_sinks: Vec<Arc<dyn Notifier>>,
    ) -> Self {
        let mut notifications = NotificationCenter::new(config.notification_ttl(), clipboard)
            .with_sink(Arc::new(TracingNotifier));
        for sink in extra_sinks {
            notifications = notifications.with_sink(sink);
        }
        let pipeline = Arc::new(SharePipeline::new(
            &config.selectors,
            strategy,
            Arc::new(notifications),
        ));
        Self { config, pipeline }
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        self.pipeline.notifications()
    }
}
