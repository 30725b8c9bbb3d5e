//! JSON snapshot of a host document, as posted by the browser relay.
//!
//! ```json
//! { "tag": "body", "children": [
//!     { "tag": "div", "classes": ["font-user-message"], "text": "Hi" }
//! ] }
//! ```
//!
//! Text nodes use the tag `#text`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::port::ElementSpec;

pub const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    /// The node itself, without children.
    pub(crate) fn to_spec(&self) -> ElementSpec {
        ElementSpec {
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            attrs: self.attrs.clone(),
            text: self.text.clone(),
        }
    }
}
