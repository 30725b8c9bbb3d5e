//! Page-side orchestration: inject the share control once the host toolbar
//! exists, and run extract → render → deliver when it is clicked.

pub mod controller;
pub mod pipeline;

pub use controller::{control_spec, ControllerState, UiController, WatchHandle};
pub use pipeline::{SharePipeline, ShareReport};
