//! Transient on-screen notifications for share outcomes.
//!
//! At most one notification is active. It disappears after its time-to-live
//! or on a click outside it; a share-link notification offers a copy action
//! whose label reads `Copied!` for a short while after use.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chatshare_core::{DeliveryOutcome, Error, Result};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::clipboard::Clipboard;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotificationKind {
    ShareLink { url: String },
    Saved { path: PathBuf },
    Failure { message: String },
}

impl NotificationKind {
    pub fn from_outcome(outcome: &DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Shared { url } => Self::ShareLink { url: url.clone() },
            DeliveryOutcome::Saved { path } => Self::Saved { path: path.clone() },
        }
    }

    pub fn failure(err: &Error) -> Self {
        let message = match err {
            Error::Network(_) => format!("Could not reach the share service. {}", err),
            Error::MalformedResponse(_) => {
                format!("The share service returned an unexpected reply. {}", err)
            }
            _ => err.to_string(),
        };
        Self::Failure { message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    #[serde(flatten)]
    pub kind: NotificationKind,
    #[serde(rename = "ttlMs")]
    pub ttl_ms: u64,
}

/// Receives every notification as it is shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match &notification.kind {
            NotificationKind::ShareLink { url } => info!("Share link ready: {}", url),
            NotificationKind::Saved { path } => info!("Conversation saved: {}", path.display()),
            NotificationKind::Failure { message } => warn!("Share failed: {}", message),
        }
    }
}

struct Active {
    notification: Notification,
    expires_at: Instant,
    copied_until: Option<Instant>,
}

pub struct NotificationCenter {
    ttl: Duration,
    clipboard: Arc<dyn Clipboard>,
    sinks: Vec<Arc<dyn Notifier>>,
    next_id: AtomicU64,
    active: Mutex<Option<Active>>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            ttl,
            clipboard,
            sinks: Vec::new(),
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Show a notification, replacing any active one.
    pub fn show(&self, kind: NotificationKind) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            ttl_ms: self.ttl.as_millis() as u64,
        };
        *self.active.lock() = Some(Active {
            notification: notification.clone(),
            expires_at: Instant::now() + self.ttl,
            copied_until: None,
        });
        for sink in &self.sinks {
            sink.notify(&notification);
        }
        notification
    }

    /// The visible notification, if it has not expired or been dismissed.
    pub fn current(&self) -> Option<Notification> {
        let mut active = self.active.lock();
        Self::expire(&mut active);
        active.as_ref().map(|a| a.notification.clone())
    }

    /// Remove the active notification. Returns whether one was visible.
    pub fn dismiss(&self) -> bool {
        let mut active = self.active.lock();
        Self::expire(&mut active);
        active.take().is_some()
    }

    /// A click landed outside the notification.
    pub fn click_outside(&self) -> bool {
        self.dismiss()
    }

    /// Copy the active share link to the clipboard. Returns `Ok(false)` when
    /// no share link is showing.
    pub fn copy_link(&self) -> Result<bool> {
        let mut active = self.active.lock();
        Self::expire(&mut active);
        let Some(current) = active.as_mut() else {
            return Ok(false);
        };
        let NotificationKind::ShareLink { url } = &current.notification.kind else {
            return Ok(false);
        };
        self.clipboard.write_text(url)?;
        current.copied_until = Some(Instant::now() + COPIED_FEEDBACK);
        Ok(true)
    }

    /// Label of the copy button right now.
    pub fn copy_label(&self) -> &'static str {
        let active = self.active.lock();
        match active.as_ref().and_then(|a| a.copied_until) {
            Some(until) if Instant::now() < until => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }

    fn expire(active: &mut Option<Active>) {
        if active.as_ref().is_some_and(|a| Instant::now() >= a.expires_at) {
            *active = None;
        }
    }
}
