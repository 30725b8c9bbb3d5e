//! DOM ports the extraction and UI layers depend on.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chatshare_core::Result;

/// Handle to an element in a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Read access to the host document.
pub trait DomReader {
    /// Attached elements carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<NodeId>;

    /// First attached `tag` element whose `attr` equals `value`.
    fn query_attribute(&self, tag: &str, attr: &str, value: &str) -> Option<NodeId>;

    /// Relative document position: `Less` when `a` precedes `b`.
    fn compare_position(&self, a: NodeId, b: NodeId) -> Ordering;

    /// Concatenated text of the node and all its descendants.
    fn text_content(&self, node: NodeId) -> String;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// True when `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn query_class(&self, class: &str) -> Option<NodeId> {
        self.elements_by_class(class).into_iter().next()
    }
}

/// Write access to the host document.
pub trait DomWriter {
    /// Insert a new element as the next sibling of `anchor`.
    fn insert_after(&mut self, anchor: NodeId, element: ElementSpec) -> Result<NodeId>;

    /// Detach `node` and its subtree from the document.
    fn remove(&mut self, node: NodeId) -> Result<()>;
}

/// Description of an element to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Kind of structural change observed in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Inserted,
    Removed,
    Text,
}

/// A change notification published to mutation subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub target: NodeId,
    pub kind: MutationKind,
}
