//! Core types for chatshare: data model, host selectors and configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DataPaths, DeliveryMode, HostSelectors, ShareConfig};
pub use error::{Error, Result};
pub use types::*;
