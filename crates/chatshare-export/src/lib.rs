//! Turns a host page into a standalone HTML transcript.
//!
//! [`MessageExtractor`] reads role-tagged turns through the DOM port and
//! [`HtmlRenderer`] produces the self-contained document.

pub mod extract;
pub mod render;

pub use extract::MessageExtractor;
pub use render::{escape_html, HtmlRenderer};
