//! Delivery of rendered transcripts.
//!
//! Exactly one [`DeliveryStrategy`] is active per deployment: remote share
//! (upload and return a link) or local download (write an HTML file). The
//! outcome is surfaced to the user through the [`NotificationCenter`].

pub mod clipboard;
pub mod local;
pub mod notify;
pub mod remote;
pub mod strategy;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use local::LocalDownload;
pub use notify::{Notification, NotificationCenter, NotificationKind, Notifier, TracingNotifier};
pub use remote::RemoteShare;
pub use strategy::{build_strategy, DeliveryStrategy};
