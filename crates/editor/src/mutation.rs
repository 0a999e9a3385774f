use serde::Serialize;
use tracing::{trace, warn};

use vellum_dom::{tag, DomError, Element, NodeId};

use crate::error::EditorError;
use crate::selection::Range;
use crate::session::EditorSession;

/// Offsets of an inserted text run inside the text node it was merged
/// into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergedOffsets {
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Caret position resulting from a selection removal. `prev_container` is
/// set when the removal emptied a format element, as a caret fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedRange {
    pub container: NodeId,
    pub offset: usize,
    pub prev_container: Option<NodeId>,
}

/// Result of detaching a range format element: the common parent, the
/// first/last node of the detached content (or the nearest remaining
/// siblings when the content was removed), and everything taken out of the
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    pub cc: NodeId,
    pub sc: Option<NodeId>,
    pub ec: Option<NodeId>,
    pub remove_array: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedEdges {
    pub sc: Option<NodeId>,
    pub ec: Option<NodeId>,
}

impl EditorSession {
    /// Inserts `node` at the current range (after deleting any selected
    /// content), or immediately after `after_node`. An inserted text node
    /// is merged with adjacent text siblings; the returned offsets mark the
    /// inserted run inside the merged node, `None` for a pure insertion.
    pub fn insert_node(
        &mut self,
        node: NodeId,
        after_node: Option<NodeId>,
    ) -> Result<Option<MergedOffsets>, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let merged = self.insert_node_no_push(node, after_node)?;
        self.history_push();
        Ok(merged)
    }

    pub(crate) fn insert_node_no_push(
        &mut self,
        node: NodeId,
        after_node: Option<NodeId>,
    ) -> Result<Option<MergedOffsets>, EditorError> {
        if self.range.map(|r| !r.is_collapsed()).unwrap_or(false) {
            self.remove_selection_contents()?;
        }

        let (mut parent, mut index) = match after_node {
            Some(after) => {
                let parent = self
                    .tree
                    .parent(after)
                    .ok_or(EditorError::Dom(DomError::Detached))?;
                let ix = self
                    .tree
                    .index_in_parent(after)
                    .ok_or(EditorError::Dom(DomError::Detached))?;
                (parent, ix + 1)
            }
            None => self.caret_insertion_point()?,
        };

        // Block-level nodes land at block level, never inside a format or
        // inline wrapper.
        let node_is_block = self
            .tree
            .tag(node)
            .map(|t| tag::is_format(t) || tag::is_range(t) || tag::is_component(t))
            .unwrap_or(false);
        if node_is_block {
            let root = self.tree.root();
            while parent != root && !self.tree.tag(parent).map(tag::is_range).unwrap_or(false) {
                let up = self
                    .tree
                    .parent(parent)
                    .ok_or(EditorError::Dom(DomError::Detached))?;
                index = self
                    .tree
                    .index_in_parent(parent)
                    .map(|i| i + 1)
                    .unwrap_or_else(|| self.tree.child_count(up));
                parent = up;
            }
        }

        self.tree.insert_child(parent, index, node)?;
        trace!(?node, "inserted node");

        // Bare text and inline wrappers never sit directly under the root
        // or a range element.
        let parent_is_container = parent == self.tree.root()
            || self.tree.tag(parent).map(tag::is_range).unwrap_or(false);
        if parent_is_container && self.is_stray_inline(node) {
            let fmt = self
                .tree
                .create_element(Element::new(&self.options.default_tag));
            self.tree.insert_child(parent, index, fmt)?;
            self.tree.append_child(fmt, node)?;
        }

        let mut merged = None;
        let caret;
        if self.tree.is_text(node) {
            let node_len = self.tree.len(node);
            let prev = self.tree.prev_sibling(node).filter(|&p| self.tree.is_text(p));
            let next = self.tree.next_sibling(node).filter(|&n| self.tree.is_text(n));
            if prev.is_some() || next.is_some() {
                let (base, start) = match prev {
                    Some(prev) => {
                        let start = self.tree.len(prev);
                        let text = self.tree.text(node).map(str::to_string).unwrap_or_default();
                        if let Some(t) = self.tree.text_mut(prev) {
                            t.push_str(&text);
                        }
                        self.tree.detach(node);
                        (prev, start)
                    }
                    None => (node, 0),
                };
                if let Some(next) = next {
                    let text = self.tree.text(next).map(str::to_string).unwrap_or_default();
                    if let Some(t) = self.tree.text_mut(base) {
                        t.push_str(&text);
                    }
                    self.tree.detach(next);
                }
                merged = Some(MergedOffsets {
                    start_offset: start,
                    end_offset: start + node_len,
                });
                caret = Range::collapsed(base, start + node_len);
            } else {
                caret = Range::collapsed(node, node_len);
            }
        } else {
            let parent = self.tree.parent(node).unwrap_or_else(|| self.tree.root());
            let ix = self.tree.index_in_parent(node).map(|i| i + 1).unwrap_or(0);
            caret = Range::collapsed(parent, ix);
        }
        self.set_range_internal(caret);
        Ok(merged)
    }

    /// Deletes everything the current range covers, splitting partially
    /// covered boundary text nodes. The tree is never left without a
    /// format element.
    pub fn remove_node(&mut self) -> Result<RemovedRange, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let removed = self.remove_selection_contents()?;
        self.history_push();
        Ok(removed)
    }

    pub(crate) fn remove_selection_contents(&mut self) -> Result<RemovedRange, EditorError> {
        let r = self.get_range()?;
        if r.is_collapsed() {
            return Ok(RemovedRange {
                container: r.sc,
                offset: r.so,
                prev_container: None,
            });
        }

        if r.sc == r.ec && self.tree.is_text(r.sc) {
            let so = self.tree.clamp_text_offset(r.sc, r.so);
            let eo = self.tree.clamp_text_offset(r.ec, r.eo);
            if let Some(t) = self.tree.text_mut(r.sc) {
                t.replace_range(so..eo, "");
            }
            let (container, offset) = if self.tree.len(r.sc) == 0 {
                let parent = self.tree.parent(r.sc);
                let ix = self.tree.index_in_parent(r.sc).unwrap_or(0);
                self.tree.detach(r.sc);
                match parent {
                    Some(p) => (p, ix.min(self.tree.child_count(p))),
                    None => (self.tree.root(), 0),
                }
            } else {
                (r.sc, so)
            };
            self.ensure_document_integrity();
            let (container, offset) = if self.tree.is_attached(container) {
                (container, offset)
            } else {
                let caret = self.initial_caret();
                (caret.sc, caret.so)
            };
            self.set_range_internal(Range::collapsed(container, offset));
            return Ok(RemovedRange {
                container,
                offset,
                prev_container: None,
            });
        }

        let start_key = self.sel_key(r.sc, r.so).ok_or(EditorError::InvalidRange)?;
        let end_key = self.sel_key(r.ec, r.eo).ok_or(EditorError::InvalidRange)?;

        let start_fmt = self.format_ancestor(r.sc);
        let end_fmt = self.format_ancestor(r.ec);
        let prev_of_start_fmt = start_fmt.and_then(|f| self.tree.prev_sibling(f));

        for node in self.topmost_covered(&start_key, &end_key) {
            self.tree.detach(node);
        }

        if self.tree.is_attached(r.sc) && self.tree.is_text(r.sc) {
            let so = self.tree.clamp_text_offset(r.sc, r.so);
            if let Some(t) = self.tree.text_mut(r.sc) {
                t.truncate(so);
            }
            if self.tree.len(r.sc) == 0 {
                self.tree.detach(r.sc);
            }
        }
        if self.tree.is_attached(r.ec) && self.tree.is_text(r.ec) {
            let eo = self.tree.clamp_text_offset(r.ec, r.eo);
            if let Some(t) = self.tree.text_mut(r.ec) {
                t.replace_range(..eo, "");
            }
            if self.tree.len(r.ec) == 0 {
                self.tree.detach(r.ec);
            }
        }

        // Emptied boundary formats are removed entirely.
        let mut prev_container = None;
        if let (Some(sf), Some(ef)) = (start_fmt, end_fmt) {
            if sf != ef {
                if self.tree.is_attached(sf) && self.tree.child_count(sf) == 0 {
                    prev_container =
                        prev_of_start_fmt.filter(|&p| self.tree.is_attached(p));
                    self.tree.detach(sf);
                }
                if self.tree.is_attached(ef) && self.tree.child_count(ef) == 0 {
                    self.tree.detach(ef);
                }
            }
        }

        self.ensure_document_integrity();

        let caret = if self.tree.is_attached(r.ec) && self.tree.is_text(r.ec) {
            (r.ec, 0)
        } else if let Some(f) = end_fmt.filter(|&f| self.tree.is_attached(f)) {
            (f, 0)
        } else if self.tree.is_attached(r.sc) && self.tree.is_text(r.sc) {
            (r.sc, self.tree.len(r.sc))
        } else if let Some(f) = start_fmt.filter(|&f| self.tree.is_attached(f)) {
            (f, self.tree.child_count(f))
        } else if let Some(p) = prev_container.filter(|&p| self.tree.is_attached(p)) {
            (p, self.tree.len(p))
        } else {
            let caret = self.initial_caret();
            (caret.sc, caret.so)
        };
        self.set_range_internal(Range::collapsed(caret.0, caret.1));
        Ok(RemovedRange {
            container: caret.0,
            offset: caret.1,
            prev_container,
        })
    }

    /// Creates a new format element as the next sibling of `element`, of
    /// the named tag or matching `element`'s own tag.
    pub fn append_format_tag(
        &mut self,
        element: NodeId,
        format: Option<&str>,
    ) -> Result<NodeId, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let new = self.append_format_sibling(element, format)?;
        self.set_range_internal(Range::collapsed(new, 0));
        self.history_push();
        Ok(new)
    }

    pub(crate) fn append_format_sibling(
        &mut self,
        element: NodeId,
        format: Option<&str>,
    ) -> Result<NodeId, EditorError> {
        let tag_name = match format {
            Some(t) => t.to_ascii_lowercase(),
            None => match self.tree.tag(element) {
                Some(t) if tag::is_format(t) => t.to_string(),
                _ => self.options.default_tag.clone(),
            },
        };
        let new = self.tree.create_element(Element::new(tag_name));
        self.tree.insert_after(element, new)?;
        Ok(new)
    }

    /// Inserts a component on its own line and returns the line that
    /// follows it (inside a list item, the component is inserted within
    /// the item instead). With `not_history_push` the history stack and
    /// range are left to the caller.
    pub fn insert_component(
        &mut self,
        element: NodeId,
        not_history_push: bool,
    ) -> Result<NodeId, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }

        let caret_node = self.range.map(|r| r.sc);
        let list_item = caret_node.and_then(|n| {
            std::iter::once(n)
                .chain(self.tree.ancestors(n))
                .find(|&a| self.tree.tag(a) == Some("li"))
        });
        if list_item.is_some() {
            let (parent, index) = self.caret_insertion_point()?;
            self.tree.insert_child(parent, index, element)?;
            if !not_history_push {
                let after = self
                    .tree
                    .index_in_parent(element)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let parent = self.tree.parent(element).unwrap_or_else(|| self.tree.root());
                self.set_range_internal(Range::collapsed(parent, after));
                self.history_push();
            }
            return Ok(element);
        }

        let root = self.tree.root();
        let caret_fmt = caret_node
            .and_then(|n| self.format_ancestor(n))
            .filter(|&f| self.tree.is_attached(f));
        let new_line = match caret_fmt {
            Some(fmt) if self.is_empty_line(fmt) => {
                // an empty line is reused as the line after the component
                self.tree.insert_before(fmt, element)?;
                fmt
            }
            Some(fmt) => {
                self.tree.insert_after(fmt, element)?;
                let line = self
                    .tree
                    .create_element(Element::new(&self.options.default_tag));
                self.tree.insert_after(element, line)?;
                line
            }
            None => {
                self.tree.append_child(root, element)?;
                let line = self
                    .tree
                    .create_element(Element::new(&self.options.default_tag));
                self.tree.append_child(root, line)?;
                line
            }
        };

        if !not_history_push {
            self.set_range_internal(Range::collapsed(new_line, 0));
            self.history_push();
        }
        Ok(new_line)
    }

    /// Wraps every selected format element in `range_element`, preserving
    /// order and the positions of non-selected siblings. Partially
    /// selected lists are split so only the selected items move.
    pub fn apply_range_format_element(
        &mut self,
        range_element: Element,
    ) -> Result<NodeId, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let selected = self.get_selected_elements(None);
        if selected.is_empty() {
            return Err(EditorError::NoSelection);
        }
        let units = self.wrap_units(&selected)?;
        let first = units[0];
        let wrapper = self.tree.create_element(range_element);
        self.tree.insert_before(first, wrapper)?;
        for unit in units {
            self.tree.append_child(wrapper, unit)?;
        }

        let range = match (
            self.first_text_descendant(wrapper),
            self.last_text_descendant(wrapper),
        ) {
            (Some(first), Some(last)) => Range {
                sc: first,
                so: 0,
                ec: last,
                eo: self.tree.len(last),
            },
            _ => Range {
                sc: wrapper,
                so: 0,
                ec: wrapper,
                eo: self.tree.child_count(wrapper),
            },
        };
        self.set_range_internal(range);
        self.history_push();
        Ok(wrapper)
    }

    /// Groups the selected format elements into wrappable units: a fully
    /// selected list moves as a whole, a partially selected list is split
    /// around the selected run.
    fn wrap_units(&mut self, selected: &[NodeId]) -> Result<Vec<NodeId>, EditorError> {
        let mut units = Vec::new();
        let mut i = 0;
        while i < selected.len() {
            let node = selected[i];
            let parent = self.tree.parent(node);
            let list = parent.filter(|&p| self.tree.tag(p).map(tag::is_list).unwrap_or(false));
            let Some(list) = list else {
                units.push(node);
                i += 1;
                continue;
            };

            let mut run = vec![node];
            while i + run.len() < selected.len()
                && self.tree.parent(selected[i + run.len()]) == Some(list)
            {
                run.push(selected[i + run.len()]);
            }

            let list_len = self.tree.child_count(list);
            if run.len() == list_len {
                units.push(list);
            } else {
                let template = self
                    .tree
                    .element(list)
                    .cloned()
                    .ok_or(EditorError::Dom(DomError::NotAnElement))?;
                let first_ix = self
                    .tree
                    .index_in_parent(run[0])
                    .ok_or(EditorError::Dom(DomError::Detached))?;
                let sub = self.tree.create_element(template.clone());
                if first_ix == 0 {
                    self.tree.insert_before(list, sub)?;
                } else if first_ix + run.len() == list_len {
                    self.tree.insert_after(list, sub)?;
                } else {
                    let tail = self.tree.create_element(template);
                    self.tree.insert_after(list, tail)?;
                    let trailing: Vec<NodeId> =
                        self.tree.children(list)[first_ix + run.len()..].to_vec();
                    for item in trailing {
                        self.tree.append_child(tail, item)?;
                    }
                    self.tree.insert_after(list, sub)?;
                }
                for &item in &run {
                    self.tree.append_child(sub, item)?;
                }
                units.push(sub);
            }
            i += run.len();
        }
        Ok(units)
    }

    /// Detaches `selected_formats` (all children when empty/None) from
    /// `range_element`. List items become plain format elements unless the
    /// replacement wrapper is itself a list; `remove` deletes the content
    /// instead of unwrapping it. Unselected children stay wrapped in
    /// clones of the range element, so a middle selection splits it.
    pub fn detach_range_format_element(
        &mut self,
        range_element: NodeId,
        selected_formats: Option<&[NodeId]>,
        new_range_element: Option<Element>,
        remove: bool,
        not_history_push: bool,
    ) -> Result<Detached, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let parent = self
            .tree
            .parent(range_element)
            .ok_or(EditorError::Dom(DomError::Detached))?;
        let base_ix = self
            .tree
            .index_in_parent(range_element)
            .ok_or(EditorError::Dom(DomError::Detached))?;
        let keeper_template = self
            .tree
            .element(range_element)
            .cloned()
            .ok_or(EditorError::Dom(DomError::NotAnElement))?;

        let children: Vec<NodeId> = self.tree.children(range_element).to_vec();
        let take_all = selected_formats.map(|s| s.is_empty()).unwrap_or(true);
        let from_list = self
            .tree
            .tag(range_element)
            .map(tag::is_list)
            .unwrap_or(false);
        let wrapper_template = new_range_element;
        let wrapper_is_list = wrapper_template
            .as_ref()
            .map(|el| tag::is_list(&el.tag))
            .unwrap_or(false);
        let default_tag = self.options.default_tag.clone();

        let mut insert_ix = base_ix;
        let mut keeper: Option<NodeId> = None;
        let mut wrapper: Option<NodeId> = None;
        let mut detached: Vec<NodeId> = Vec::new();
        let mut remove_array: Vec<NodeId> = vec![range_element];

        for child in children {
            let taken = take_all || selected_formats.map(|s| s.contains(&child)).unwrap_or(true);
            if taken {
                keeper = None;
                if remove {
                    self.tree.detach(child);
                    remove_array.push(child);
                    continue;
                }
                if from_list && self.tree.tag(child) == Some("li") && !wrapper_is_list {
                    if let Some(el) = self.tree.element_mut(child) {
                        el.tag = default_tag.clone();
                    }
                }
                match &wrapper_template {
                    Some(template) => {
                        let w = match wrapper {
                            Some(w) => w,
                            None => {
                                let w = self.tree.create_element(template.clone());
                                self.tree.insert_child(parent, insert_ix, w)?;
                                insert_ix += 1;
                                wrapper = Some(w);
                                w
                            }
                        };
                        self.tree.append_child(w, child)?;
                    }
                    None => {
                        self.tree.insert_child(parent, insert_ix, child)?;
                        insert_ix += 1;
                    }
                }
                detached.push(child);
            } else {
                let k = match keeper {
                    Some(k) => k,
                    None => {
                        let k = self.tree.create_element(keeper_template.clone());
                        self.tree.insert_child(parent, insert_ix, k)?;
                        insert_ix += 1;
                        keeper = Some(k);
                        k
                    }
                };
                self.tree.append_child(k, child)?;
            }
        }

        self.tree.detach(range_element);

        let (sc, ec) = if remove && detached.is_empty() && wrapper.is_none() {
            let siblings = self.tree.children(parent);
            (
                siblings.get(insert_ix).copied(),
                base_ix.checked_sub(1).and_then(|ix| siblings.get(ix).copied()),
            )
        } else if let Some(w) = wrapper {
            (self.tree.first_child(w), self.tree.last_child(w))
        } else {
            (detached.first().copied(), detached.last().copied())
        };

        self.ensure_document_integrity();

        if !not_history_push {
            let range = match (sc, ec) {
                (Some(s), Some(e)) if self.tree.is_attached(s) && self.tree.is_attached(e) => {
                    let sc = self.first_text_descendant(s).unwrap_or(s);
                    let ec = self.last_text_descendant(e).unwrap_or(e);
                    Range {
                        sc,
                        so: 0,
                        ec,
                        eo: self.tree.len(ec),
                    }
                }
                _ => self.initial_caret(),
            };
            self.set_range_internal(range);
            self.history_push();
        }

        Ok(Detached {
            cc: parent,
            sc,
            ec,
            remove_array,
        })
    }

    /// Detaches `selected_formats` from their parent lists. Returns the
    /// first/last resulting elements for caret restoration.
    pub fn detach_list(
        &mut self,
        selected_formats: &[NodeId],
        remove: bool,
    ) -> Result<DetachedEdges, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for &node in selected_formats {
            let Some(parent) = self.tree.parent(node) else {
                continue;
            };
            if !self.tree.tag(parent).map(tag::is_list).unwrap_or(false) {
                continue;
            }
            match groups.last_mut() {
                Some((list, items)) if *list == parent => items.push(node),
                _ => groups.push((parent, vec![node])),
            }
        }

        let mut sc = None;
        let mut ec = None;
        for (list, items) in groups {
            if !self.tree.is_attached(list) {
                continue;
            }
            let result = self.detach_range_format_element(list, Some(&items), None, remove, true)?;
            if sc.is_none() {
                sc = result.sc;
            }
            if result.ec.is_some() {
                ec = result.ec;
            }
        }
        self.history_push();
        Ok(DetachedEdges { sc, ec })
    }

    /// Restores the two tree invariants after a structural mutation: bare
    /// text/inline content gets wrapped in a format element, and the tree
    /// always keeps at least one format element.
    pub(crate) fn ensure_document_integrity(&mut self) {
        let root = self.tree.root();
        let mut containers: Vec<NodeId> = vec![root];
        containers.extend(
            self.tree
                .preorder(root)
                .into_iter()
                .filter(|&n| n != root && self.tree.tag(n).map(tag::is_range).unwrap_or(false)),
        );

        let mut repaired = false;
        for container in containers {
            if !self.tree.is_attached(container) {
                continue;
            }
            let wrap_tag = if self.tree.tag(container).map(tag::is_list).unwrap_or(false) {
                "li".to_string()
            } else {
                self.options.default_tag.clone()
            };
            loop {
                let children = self.tree.children(container).to_vec();
                let Some(start) = children.iter().position(|&c| self.is_stray_inline(c)) else {
                    break;
                };
                let mut run = vec![children[start]];
                for &c in &children[start + 1..] {
                    if self.is_stray_inline(c) {
                        run.push(c);
                    } else {
                        break;
                    }
                }
                let fmt = self.tree.create_element(Element::new(&wrap_tag));
                if self.tree.insert_child(container, start, fmt).is_err() {
                    break;
                }
                for node in run {
                    if self.tree.append_child(fmt, node).is_err() {
                        break;
                    }
                }
                repaired = true;
            }
        }

        let has_format = self
            .tree
            .preorder(root)
            .into_iter()
            .any(|n| self.is_format_element(n));
        if !has_format {
            let fmt = self
                .tree
                .create_element(Element::new(&self.options.default_tag));
            let _ = self.tree.append_child(root, fmt);
            repaired = true;
        }
        if repaired {
            warn!("document structure repaired");
        }
    }

    pub(crate) fn is_stray_inline(&self, id: NodeId) -> bool {
        if self.tree.is_text(id) {
            return true;
        }
        self.tree
            .tag(id)
            .map(|t| tag::is_inline(t) || t == "br")
            .unwrap_or(false)
    }

    pub(crate) fn is_empty_line(&self, fmt: NodeId) -> bool {
        self.tree
            .children(fmt)
            .iter()
            .all(|&c| self.tree.text(c).map(str::is_empty).unwrap_or(false))
    }

    /// Resolves the caret to an (element, child-index) insertion point,
    /// splitting the text node under the caret when needed.
    pub(crate) fn caret_insertion_point(&mut self) -> Result<(NodeId, usize), EditorError> {
        let (container, offset) = match self.range {
            Some(_) => {
                let r = self.get_range()?;
                (r.sc, self.tree.clamp_text_offset(r.sc, r.so))
            }
            None => self.document_end_point(),
        };
        if !self.tree.is_attached(container) {
            return Err(EditorError::InvalidRange);
        }
        if self.tree.is_text(container) {
            let parent = self
                .tree
                .parent(container)
                .ok_or(EditorError::InvalidRange)?;
            let ix = self
                .tree
                .index_in_parent(container)
                .ok_or(EditorError::InvalidRange)?;
            if offset == 0 {
                Ok((parent, ix))
            } else if offset == self.tree.len(container) {
                Ok((parent, ix + 1))
            } else {
                let right = self.tree.split_text(container, offset)?;
                let ix = self
                    .tree
                    .index_in_parent(right)
                    .ok_or(EditorError::InvalidRange)?;
                Ok((parent, ix))
            }
        } else {
            Ok((container, offset.min(self.tree.child_count(container))))
        }
    }

    pub(crate) fn document_end_point(&self) -> (NodeId, usize) {
        let root = self.tree.root();
        let last_fmt = self
            .tree
            .preorder(root)
            .into_iter()
            .filter(|&n| self.is_format_element(n))
            .last();
        match last_fmt {
            Some(fmt) => (fmt, self.tree.child_count(fmt)),
            None => (root, self.tree.child_count(root)),
        }
    }
}
