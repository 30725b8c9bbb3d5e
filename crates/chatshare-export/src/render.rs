//! Standalone HTML rendering of a conversation.

use chatshare_core::{Conversation, Message, RenderedArtifact};

pub const DOCUMENT_TITLE: &str = "Claude Chat Conversation";

const STYLE: &str = r#"    body {
      font-family: system-ui, -apple-system, sans-serif;
      line-height: 1.5;
      max-width: 800px;
      margin: 0 auto;
      padding: 20px;
      background: #f9fafb;
    }
    .message {
      margin: 20px 0;
      padding: 15px;
      border-radius: 8px;
    }
    .human {
      background: #e5e7eb;
    }
    .assistant {
      background: #dbeafe;
    }
    .role {
      font-weight: bold;
      margin-bottom: 8px;
    }
    .content {
      white-space: pre-wrap;
    }
"#;

/// Renders conversations into self-contained HTML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, conversation: &Conversation) -> RenderedArtifact {
        let mut html = String::with_capacity(1024 + conversation.len() * 256);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str("  <title>");
        html.push_str(DOCUMENT_TITLE);
        html.push_str("</title>\n  <style>\n");
        html.push_str(STYLE);
        html.push_str("  </style>\n</head>\n<body>\n");
        for message in conversation {
            push_message(&mut html, message);
        }
        html.push_str("</body>\n</html>\n");
        RenderedArtifact::new(html)
    }
}

fn push_message(html: &mut String, message: &Message) {
    html.push_str("  <div class=\"message ");
    html.push_str(message.role.name());
    html.push_str("\">\n    <div class=\"role\">");
    html.push_str(message.role.label());
    html.push_str("</div>\n    <div class=\"content\">");
    html.push_str(&escape_html(&message.content));
    html.push_str("</div>\n  </div>\n");
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
