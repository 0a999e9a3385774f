use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::DomError;

/// Index of a node in a [`DocumentTree`] arena. Ids are only meaningful for
/// the tree that created them; a detached node keeps its id and can be
/// reinserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Owned, arena-indexed document tree. The root element is created with the
/// tree and never removed. All structural mutation goes through `&mut self`
/// methods; detached subtrees stay in the arena until the tree is dropped.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        let root = NodeData {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(Element::new("div")),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push_node(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.node_mut(id).kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Element(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let ix = self.index_in_parent(id)?;
        self.children(parent).get(ix + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let ix = self.index_in_parent(id)?;
        ix.checked_sub(1)
            .and_then(|ix| self.children(parent).get(ix).copied())
    }

    /// Ancestors of `id`, nearest first, root last.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// True if `id` is the root or reaches the root through its parents.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Content length: byte length for text nodes, child count for elements.
    pub fn len(&self, id: NodeId) -> usize {
        match &self.node(id).kind {
            NodeKind::Text(t) => t.len(),
            NodeKind::Element(_) => self.child_count(id),
        }
    }

    pub fn is_empty(&self, id: NodeId) -> bool {
        self.len(id) == 0
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child)
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DomError> {
        if !self.is_element(parent) {
            return Err(DomError::NotAnElement);
        }
        if child == self.root || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::InvalidInsertion);
        }
        self.detach(child);
        let index = index.min(self.child_count(parent));
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached)?;
        let index = self.index_in_parent(reference).ok_or(DomError::Detached)?;
        self.insert_child(parent, index, child)
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached)?;
        let index = self.index_in_parent(reference).ok_or(DomError::Detached)?;
        self.insert_child(parent, index + 1, child)
    }

    /// Unlinks `id` from its parent. No-op for the root or already-detached
    /// nodes; the subtree under `id` stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.node_mut(parent).children.retain(|&c| c != id);
        self.node_mut(id).parent = None;
    }

    /// Detaches every child of `id`, returning them in order.
    pub fn clear_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for &child in &children {
            self.node_mut(child).parent = None;
        }
        children
    }

    /// Splits a text node at `offset` (clamped to a char boundary) and
    /// inserts the right half after it. Returns the right half's id.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id).ok_or(DomError::NotText)?;
        if offset > text.len() {
            return Err(DomError::OffsetOutOfBounds {
                offset,
                len: text.len(),
            });
        }
        let offset = clamp_to_char_boundary(text, offset);
        let tail = text[offset..].to_string();
        if let Some(t) = self.text_mut(id) {
            t.truncate(offset);
        }
        let right = self.create_text(tail);
        self.insert_after(id, right)?;
        Ok(right)
    }

    pub fn clamp_text_offset(&self, id: NodeId, offset: usize) -> usize {
        match self.text(id) {
            Some(t) => clamp_to_char_boundary(t, offset.min(t.len())),
            None => offset.min(self.child_count(id)),
        }
    }

    /// Preorder traversal of the subtree rooted at `id`, including `id`.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Child-index path from the root to `id`. `None` if detached.
    pub fn path_of(&self, id: NodeId) -> Option<Vec<usize>> {
        if id == self.root {
            return Some(Vec::new());
        }
        if !self.is_attached(id) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for &ix in path {
            current = self.children(current).get(ix).copied()?;
        }
        Some(current)
    }

    /// Document-order comparison of two attached nodes.
    pub fn order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        let pa = self.path_of(a)?;
        let pb = self.path_of(b)?;
        Some(pa.cmp(&pb))
    }

    /// Lowest common ancestor of `a` and `b` (either node counts as its own
    /// ancestor here).
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let chain: Vec<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|n| chain.contains(n))
    }

    /// Clones the subtree rooted at `id` into a new detached node.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.node(id).kind.clone();
        let children = self.node(id).children.clone();
        let clone = self.push_node(kind);
        for child in children {
            let child_clone = self.deep_clone(child);
            self.node_mut(clone).children.push(child_clone);
            self.node_mut(child_clone).parent = Some(clone);
        }
        clone
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.preorder(id) {
            if let NodeKind::Text(t) = &self.node(node).kind {
                out.push_str(t);
            }
        }
        out
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}
