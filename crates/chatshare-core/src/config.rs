//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 3017;
pub const DEFAULT_SHARE_ENDPOINT: &str =
    "https://rwrcqukmifyehbrhslqi.supabase.co/functions/v1/claude-share/store";
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "claude-conversation.html";
/// Snapshots of long conversations run well past axum's 2 MiB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Paths to chatshare data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Saved artifacts for local delivery (`data/downloads/`).
    pub downloads: PathBuf,
    /// Persisted configuration (`data/config.json`).
    pub config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            downloads: root.join("downloads"),
            config_file: root.join("config.json"),
            root,
        };
        std::fs::create_dir_all(&paths.downloads)?;
        Ok(paths)
    }
}

/// Which delivery strategy a deployment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    #[serde(alias = "share")]
    Remote,
    #[serde(alias = "download")]
    Local,
}

impl DeliveryMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "remote" | "share" => Some(Self::Remote),
            "local" | "download" => Some(Self::Local),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Marker classes and attributes the host page exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSelectors {
    pub human_class: String,
    pub assistant_class: String,
    /// Tag of the toolbar element the control is inserted after.
    pub anchor_tag: String,
    pub anchor_attr: String,
    pub anchor_value: String,
    /// Class carried by the injected share control.
    pub control_class: String,
}

impl Default for HostSelectors {
    fn default() -> Self {
        Self {
            human_class: "font-user-message".into(),
            assistant_class: "font-claude-message".into(),
            anchor_tag: "button".into(),
            anchor_attr: "aria-label".into(),
            anchor_value: "Capture screenshot".into(),
            control_class: "share-button".into(),
        }
    }
}

/// Top-level chatshare configuration (persisted to `config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub delivery: DeliveryMode,
    #[serde(default = "default_endpoint")]
    pub share_endpoint: String,
    #[serde(default = "default_filename")]
    pub download_filename: String,
    /// Overrides `DataPaths::downloads` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads_dir: Option<PathBuf>,
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Largest snapshot request body the relay accepts.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub selectors: HostSelectors,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_endpoint() -> String {
    DEFAULT_SHARE_ENDPOINT.into()
}
fn default_filename() -> String {
    DEFAULT_DOWNLOAD_FILENAME.into()
}
fn default_notification_secs() -> u64 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            delivery: DeliveryMode::Remote,
            share_endpoint: DEFAULT_SHARE_ENDPOINT.into(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.into(),
            downloads_dir: None,
            notification_secs: 5,
            request_timeout_secs: 30,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            selectors: HostSelectors::default(),
        }
    }
}

impl ShareConfig {
    /// Load config from a JSON file. A missing file yields defaults; a file
    /// that does not parse is an error.
    pub fn load(config_path: &Path) -> Result<Self> {
        let json = match std::fs::read_to_string(config_path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", config_path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json).map_err(|e| {
            Error::Config(format!("Invalid config {}: {}", config_path.display(), e))
        })
    }

    /// Load from `config.json` under the data directory, then apply env
    /// overrides (`PORT`, `CHATSHARE_DELIVERY`, `CHATSHARE_ENDPOINT`).
    pub fn from_env(paths: &DataPaths) -> Result<Self> {
        let mut config = Self::load(&paths.config_file)?;

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Ok(mode) = std::env::var("CHATSHARE_DELIVERY") {
            config.delivery = DeliveryMode::from_name(&mode)
                .ok_or_else(|| Error::Config(format!("Unknown delivery mode: {}", mode)))?;
        }
        if let Ok(endpoint) = std::env::var("CHATSHARE_ENDPOINT") {
            config.share_endpoint = endpoint;
        }
        if config.downloads_dir.is_none() {
            config.downloads_dir = Some(paths.downloads.clone());
        }

        info!(
            "Config loaded: delivery={}, port={}",
            config.delivery, config.port
        );
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory local deliveries are written to.
    pub fn downloads_path(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }
}
