//! Arena-backed in-memory DOM.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chatshare_core::{Error, Result};
use tokio::sync::broadcast;
use tracing::debug;

use crate::port::{DomReader, DomWriter, ElementSpec, Mutation, MutationKind, NodeId};
use crate::snapshot::SnapshotNode;

const MUTATION_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

impl Node {
    fn from_spec(spec: ElementSpec, parent: Option<NodeId>) -> Self {
        Self {
            tag: spec.tag,
            classes: spec.classes,
            attrs: spec.attrs,
            text: spec.text,
            parent,
            children: Vec::new(),
            attached: true,
        }
    }
}

/// In-memory host document.
///
/// Removed nodes stay in the arena (their ids remain valid) but are no longer
/// reachable from the root and never match queries.
pub struct MemoryDom {
    nodes: Vec<Node>,
    root: NodeId,
    mutations: broadcast::Sender<Mutation>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty document with a `body` root.
    pub fn new() -> Self {
        Self::with_root(ElementSpec::new("body"))
    }

    fn with_root(root: ElementSpec) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CAPACITY);
        Self {
            nodes: vec![Node::from_spec(root, None)],
            root: NodeId(0),
            mutations,
        }
    }

    /// Build a document from a relay snapshot; the snapshot root becomes the
    /// document root.
    pub fn from_snapshot(snapshot: &SnapshotNode) -> Self {
        let mut dom = Self::with_root(snapshot.to_spec());
        let root = dom.root;
        for child in &snapshot.children {
            dom.load_subtree(root, child);
        }
        dom
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SnapshotNode = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    fn load_subtree(&mut self, parent: NodeId, snapshot: &SnapshotNode) {
        let id = self.push_node(parent, snapshot.to_spec());
        for child in &snapshot.children {
            self.load_subtree(id, child);
        }
    }

    fn push_node(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::from_spec(spec, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Subscribe to structural changes.
    pub fn subscribe(&self) -> broadcast::Receiver<Mutation> {
        self.mutations.subscribe()
    }

    fn publish(&self, target: NodeId, kind: MutationKind) {
        // No subscribers is fine.
        let _ = self.mutations.send(Mutation { target, kind });
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn attached_node(&self, id: NodeId) -> Result<&Node> {
        match self.node(id) {
            Some(node) if node.attached => Ok(node),
            Some(_) => Err(Error::Dom(format!("node {} is detached", id.0))),
            None => Err(Error::Dom(format!("unknown node {}", id.0))),
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.attached)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attrs.get(name).map(String::as_str)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Append a new element as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, element: ElementSpec) -> Result<NodeId> {
        self.attached_node(parent)?;
        let id = self.push_node(parent, element);
        self.publish(id, MutationKind::Inserted);
        Ok(id)
    }

    /// Replace the node's own text.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.attached_node(id)?;
        self.nodes[id.0].text = Some(text.into());
        self.publish(id, MutationKind::Text);
        Ok(())
    }

    /// Number of attached elements, root included.
    pub fn attached_count(&self) -> usize {
        self.preorder().len()
    }

    /// Attached nodes in document order.
    fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Child indices from the root down to `id`.
    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).and_then(|n| n.parent) {
            let index = self.nodes[parent.0]
                .children
                .iter()
                .position(|c| *c == current)
                .unwrap_or(usize::MAX);
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    fn detach(&mut self, id: NodeId) {
        self.nodes[id.0].attached = false;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.detach(child);
        }
    }
}

impl DomReader for MemoryDom {
    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    fn query_attribute(&self, tag: &str, attr: &str, value: &str) -> Option<NodeId> {
        self.preorder().into_iter().find(|id| {
            let node = &self.nodes[id.0];
            node.tag.eq_ignore_ascii_case(tag)
                && node.attrs.get(attr).is_some_and(|v| v == value)
        })
    }

    fn compare_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        if !self.is_attached(a) || !self.is_attached(b) {
            return a.cmp(&b);
        }
        // Lexicographic on root paths; an ancestor's path is a prefix of its
        // descendant's, so it sorts first.
        self.path(a).cmp(&self.path(b))
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if self.node(node).is_some() {
            self.collect_text(node, &mut out);
        }
        out
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl DomWriter for MemoryDom {
    fn insert_after(&mut self, anchor: NodeId, element: ElementSpec) -> Result<NodeId> {
        let parent = self
            .attached_node(anchor)?
            .parent
            .ok_or_else(|| Error::Dom("cannot insert a sibling of the root".into()))?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::from_spec(element, Some(parent)));
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|c| *c == anchor)
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        siblings.insert(index, id);

        debug!("Inserted node {} after {}", id.0, anchor.0);
        self.publish(id, MutationKind::Inserted);
        Ok(id)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        let parent = self
            .attached_node(node)?
            .parent
            .ok_or_else(|| Error::Dom("cannot remove the root".into()))?;

        self.nodes[parent.0].children.retain(|c| *c != node);
        self.detach(node);
        self.publish(node, MutationKind::Removed);
        Ok(())
    }
}
