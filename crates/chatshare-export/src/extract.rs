//! Conversation extraction from the host DOM.

use chatshare_core::{Conversation, HostSelectors, Message, Role};
use chatshare_dom::{DomReader, NodeId};
use tracing::debug;

/// Collects role-tagged turns from the page.
#[derive(Debug, Clone)]
pub struct MessageExtractor {
    human_class: String,
    assistant_class: String,
}

impl MessageExtractor {
    pub fn new(selectors: &HostSelectors) -> Self {
        Self {
            human_class: selectors.human_class.clone(),
            assistant_class: selectors.assistant_class.clone(),
        }
    }

    /// Read the visible transcript.
    ///
    /// The last human turn is the unanswered prompt still in the composer
    /// area and is left out. The page itself is not modified.
    pub fn extract<D: DomReader + ?Sized>(&self, dom: &D) -> Conversation {
        let mut human = dom.elements_by_class(&self.human_class);
        let draft = human.pop();
        let assistant = dom.elements_by_class(&self.assistant_class);

        let mut turns: Vec<(NodeId, Role)> = human
            .into_iter()
            .map(|id| (id, Role::Human))
            .chain(assistant.into_iter().map(|id| (id, Role::Assistant)))
            .collect();
        turns.sort_by(|a, b| dom.compare_position(a.0, b.0));

        let messages: Vec<Message> = turns
            .into_iter()
            .filter_map(|(id, role)| {
                let text = dom.text_content(id);
                let content = text.trim();
                if content.is_empty() {
                    None
                } else {
                    Some(Message::new(role, content))
                }
            })
            .collect();

        debug!(
            "Extracted {} messages (draft excluded: {})",
            messages.len(),
            draft.is_some()
        );
        Conversation::new(messages)
    }
}

impl Default for MessageExtractor {
    fn default() -> Self {
        Self::new(&HostSelectors::default())
    }
}
