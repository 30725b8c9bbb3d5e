//! Conversation data model shared by extraction, rendering and delivery.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// MIME type of every rendered artifact.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    /// Label shown above the turn in the exported document.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Assistant => "Claude",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The ordered transcript assembled at share time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// A standalone HTML document rendered from a [`Conversation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    html: String,
}

impl RenderedArtifact {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn content_type(&self) -> &'static str {
        HTML_CONTENT_TYPE
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Body posted to the remote share endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ShareRecord<'a> {
    pub html: &'a str,
    pub id: &'a str,
}

/// Where a delivered artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Shared { url: String },
    Saved { path: PathBuf },
}

/// Derive the conversation identifier from a chat page URL: the last
/// non-empty path segment, ignoring any query string or fragment.
///
/// `https://claude.ai/chat/abc123?foo=1` yields `abc123`. A URL with no path
/// (`https://claude.ai/`) yields an empty id, never the host.
pub fn conversation_id_from_url(url: &str) -> String {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    let url = &url[..end];
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
        None => url,
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}
