use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use vellum_dom::{tag, DocumentTree, NodeId};

use crate::error::EditorError;
use crate::session::EditorSession;

/// A pair of (container, offset) pointers into the document tree. Offsets
/// are byte positions in text nodes and child indexes in elements.
/// Endpoints are kept in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub sc: NodeId,
    pub so: usize,
    pub ec: NodeId,
    pub eo: usize,
}

impl Range {
    pub fn collapsed(container: NodeId, offset: usize) -> Self {
        Self {
            sc: container,
            so: offset,
            ec: container,
            eo: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.sc == self.ec && self.so == self.eo
    }
}

impl EditorSession {
    /// The active range. A range invalidated by a structural mutation
    /// falls back to the previous valid range, then to the tree start; a
    /// missing selection is `NoSelection`.
    pub fn get_range(&self) -> Result<Range, EditorError> {
        let valid = |r: &Range| {
            self.tree.is_attached(r.sc)
                && self.tree.is_attached(r.ec)
                && r.so <= self.tree.len(r.sc)
                && r.eo <= self.tree.len(r.ec)
        };
        match self.range {
            Some(r) if valid(&r) => Ok(r),
            Some(_) => Ok(self
                .prev_range
                .filter(valid)
                .unwrap_or_else(|| self.initial_caret())),
            None => Err(EditorError::NoSelection),
        }
    }

    /// Sets the active range after validating both endpoints resolve inside
    /// the document tree.
    pub fn set_range(
        &mut self,
        sc: NodeId,
        so: usize,
        ec: NodeId,
        eo: usize,
    ) -> Result<(), EditorError> {
        for (container, offset) in [(sc, so), (ec, eo)] {
            if !self.tree.is_attached(container) || offset > self.tree.len(container) {
                return Err(EditorError::InvalidRange);
            }
        }
        self.set_range_internal(Range { sc, so, ec, eo });
        Ok(())
    }

    /// Clears the active selection along with controller and button state.
    pub fn remove_range(&mut self) {
        self.prev_range = self.range.take();
        self.active_states.clear();
        self.controllers_off();
    }

    /// The focus container of the current range.
    pub fn selection_node(&self) -> Option<NodeId> {
        self.range.map(|r| r.ec)
    }

    /// True if `offset` is at the start or end of `container`'s content.
    pub fn is_edge_point(&self, container: NodeId, offset: usize) -> bool {
        offset == 0 || offset == self.tree.len(container)
    }

    /// Format elements intersecting the current range, in document order.
    /// `predicate` replaces the built-in format-element test.
    pub fn get_selected_elements(
        &self,
        predicate: Option<&dyn Fn(&DocumentTree, NodeId) -> bool>,
    ) -> Vec<NodeId> {
        let Some(r) = self.range else {
            return Vec::new();
        };
        let (Some(start_key), Some(end_key)) =
            (self.sel_key(r.sc, r.so), self.sel_key(r.ec, r.eo))
        else {
            return Vec::new();
        };

        let default = |tree: &DocumentTree, id: NodeId| {
            tree.tag(id).map(tag::is_format).unwrap_or(false)
        };
        let predicate: &dyn Fn(&DocumentTree, NodeId) -> bool = predicate.unwrap_or(&default);

        let root = self.tree.root();
        let mut out = Vec::new();
        for node in self.tree.preorder(root) {
            if node == root || !predicate(&self.tree, node) {
                continue;
            }
            let Some(path) = self.tree.path_of(node) else {
                continue;
            };
            let mut node_end = path.clone();
            node_end.push(usize::MAX);
            if path <= end_key && start_key <= node_end {
                out.push(node);
            }
        }
        out
    }

    /// Format elements, range elements and components in the selection.
    /// Partially selected components expand to their full extent; with
    /// `remove_duplicate`, nodes that are descendants of other returned
    /// nodes are dropped.
    pub fn get_selected_elements_and_components(&self, remove_duplicate: bool) -> Vec<NodeId> {
        let predicate = |tree: &DocumentTree, id: NodeId| {
            tree.tag(id)
                .map(|t| tag::is_format(t) || tag::is_range(t) || tag::is_component(t))
                .unwrap_or(false)
        };
        let selected = self.get_selected_elements(Some(&predicate));

        let mut out: Vec<NodeId> = Vec::new();
        for node in selected {
            let component = std::iter::once(node)
                .chain(self.tree.ancestors(node))
                .filter(|&n| self.tree.tag(n).map(tag::is_component).unwrap_or(false))
                .last();
            let node = component.unwrap_or(node);
            if !out.contains(&node) {
                out.push(node);
            }
        }

        if remove_duplicate {
            let set: BTreeSet<NodeId> = out.iter().copied().collect();
            out.retain(|&n| !self.tree.ancestors(n).any(|a| set.contains(&a)));
        }
        out
    }

    /// Lexicographic document position of a (container, offset) point.
    pub(crate) fn sel_key(&self, container: NodeId, offset: usize) -> Option<Vec<usize>> {
        let mut path = self.tree.path_of(container)?;
        path.push(offset);
        Some(path)
    }

    pub(crate) fn is_format_element(&self, id: NodeId) -> bool {
        self.tree.tag(id).map(tag::is_format).unwrap_or(false)
    }

    /// Nearest self-or-ancestor format element.
    pub(crate) fn format_ancestor(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find(|&n| self.is_format_element(n))
    }

    pub(crate) fn first_text_descendant(&self, id: NodeId) -> Option<NodeId> {
        self.tree
            .preorder(id)
            .into_iter()
            .find(|&n| self.tree.is_text(n))
    }

    pub(crate) fn last_text_descendant(&self, id: NodeId) -> Option<NodeId> {
        self.tree
            .preorder(id)
            .into_iter()
            .filter(|&n| self.tree.is_text(n))
            .last()
    }

    /// Nodes whose whole extent lies inside `[start_key, end_key]`: text
    /// nodes by their content span, elements by their slot in the parent.
    pub(crate) fn covered_nodes(&self, start_key: &[usize], end_key: &[usize]) -> BTreeSet<NodeId> {
        let root = self.tree.root();
        let mut out = BTreeSet::new();
        for node in self.tree.preorder(root) {
            if node == root {
                continue;
            }
            let Some(path) = self.tree.path_of(node) else {
                continue;
            };
            let covered = match self.tree.text(node) {
                Some(text) => {
                    let mut node_start = path.clone();
                    node_start.push(0);
                    let mut node_end = path;
                    node_end.push(text.len());
                    start_key <= node_start.as_slice() && node_end.as_slice() <= end_key
                }
                None => {
                    let mut node_end = path.clone();
                    node_end.push(usize::MAX);
                    start_key <= path.as_slice() && node_end.as_slice() <= end_key
                }
            };
            if covered {
                out.insert(node);
            }
        }
        out
    }

    /// Topmost nodes whose whole extent lies inside `[start_key, end_key]`.
    pub(crate) fn topmost_covered(&self, start_key: &[usize], end_key: &[usize]) -> Vec<NodeId> {
        let root = self.tree.root();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.tree.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let Some(path) = self.tree.path_of(node) else {
                continue;
            };
            let covered = match self.tree.text(node) {
                Some(text) => {
                    let mut node_start = path.clone();
                    node_start.push(0);
                    let mut node_end = path.clone();
                    node_end.push(text.len());
                    start_key <= node_start.as_slice() && node_end.as_slice() <= end_key
                }
                None => {
                    let mut node_end = path.clone();
                    node_end.push(usize::MAX);
                    start_key <= path.as_slice() && node_end.as_slice() <= end_key
                }
            };
            if covered {
                out.push(node);
            } else {
                for &child in self.tree.children(node).iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }
}
