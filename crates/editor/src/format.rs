use std::collections::BTreeSet;

use tracing::trace;

use vellum_dom::{tag, DocumentTree, Element, NodeId};

use crate::error::EditorError;
use crate::selection::Range;
use crate::session::EditorSession;

/// One unit of inline content inside a format element: a text run or an
/// atomic node (br, inline component), together with the inline wrapper
/// chain above it, outermost first.
struct Run {
    content: RunContent,
    stack: Vec<Element>,
    covered: bool,
}

enum RunContent {
    Text(String),
    Atom(NodeId),
}

struct NodeChangePlan<'a> {
    append: Option<&'a Element>,
    style_targets: Vec<String>,
    class_targets: Vec<String>,
    remove_tags: Vec<String>,
    strict_remove: bool,
    remove_all: bool,
    toggle_off: bool,
}

impl EditorSession {
    /// The inline-formatting toggle: adds, merges, strips or removes
    /// wrapper nodes over the selected text.
    ///
    /// With `append_node`, the selection is wrapped in a clone of it; an
    /// ancestor of the same tag has the attributes merged in instead of
    /// nesting, and a bare append node (no styles or classes) that already
    /// wraps the whole selection toggles off. Without `append_node`, the
    /// styles and classes named in `style_array` (class entries start with
    /// `.`) and the tags in `remove_node_array` are stripped; wrappers left
    /// with nothing are unwrapped. `strict_remove` limits
    /// `remove_node_array` to wrappers that end up with zero styles and
    /// classes. With no arguments at all, every inline wrapper in the
    /// selection is removed.
    pub fn node_change(
        &mut self,
        append_node: Option<&Element>,
        style_array: &[&str],
        remove_node_array: &[&str],
        strict_remove: bool,
    ) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let Some(range) = self.range else {
            // nothing selected is a no-op, not an error
            return Ok(());
        };

        let style_targets: Vec<String> = style_array
            .iter()
            .filter(|s| !s.starts_with('.'))
            .map(|s| s.to_ascii_lowercase())
            .collect();
        let class_targets: Vec<String> = style_array
            .iter()
            .filter_map(|s| s.strip_prefix('.'))
            .map(str::to_string)
            .collect();
        let remove_tags: Vec<String> = remove_node_array
            .iter()
            .map(|s| s.to_ascii_lowercase())
            .collect();
        let remove_all = append_node.is_none()
            && style_targets.is_empty()
            && class_targets.is_empty()
            && remove_tags.is_empty();

        if range.is_collapsed() {
            let Some(append) = append_node else {
                return Ok(());
            };
            // wrap the caret in an empty clone so typed text picks the
            // format up
            let (parent, index) = self.caret_insertion_point()?;
            let wrapper = self.tree.create_element(append.clone());
            let text = self.tree.create_text("");
            self.tree.insert_child(parent, index, wrapper)?;
            self.tree.append_child(wrapper, text)?;
            self.set_range_internal(Range::collapsed(text, 0));
            self.history_push();
            return Ok(());
        }

        // split boundary text nodes so the selection covers whole nodes
        let r = self.get_range()?;
        let mut start = (r.sc, self.tree.clamp_text_offset(r.sc, r.so));
        let mut end = (r.ec, self.tree.clamp_text_offset(r.ec, r.eo));
        if self.tree.is_text(start.0) && start.1 > 0 && start.1 < self.tree.len(start.0) {
            let right = self.tree.split_text(start.0, start.1)?;
            if end.0 == start.0 {
                end = (right, end.1 - start.1);
            }
            start = (right, 0);
        }
        if self.tree.is_text(end.0) && end.1 > 0 && end.1 < self.tree.len(end.0) {
            self.tree.split_text(end.0, end.1)?;
        }
        self.set_range_internal(Range {
            sc: start.0,
            so: start.1,
            ec: end.0,
            eo: end.1,
        });

        let r = self.get_range()?;
        let start_key = self.sel_key(r.sc, r.so).ok_or(EditorError::InvalidRange)?;
        let end_key = self.sel_key(r.ec, r.eo).ok_or(EditorError::InvalidRange)?;
        let covered = self.covered_nodes(&start_key, &end_key);

        let formats = self.get_selected_elements(None);
        let flattened: Vec<(NodeId, Vec<Run>)> = formats
            .iter()
            .map(|&fmt| (fmt, flatten_inline(&self.tree, fmt, &covered)))
            .collect();

        // a bare wrapper that already covers the whole selection toggles off
        let toggle_off = append_node.map_or(false, |append| {
            if !append.is_plain() {
                return false;
            }
            let mut any = false;
            let all = flattened
                .iter()
                .flat_map(|(_, runs)| runs.iter())
                .filter(|run| run.covered && matches!(run.content, RunContent::Text(_)))
                .all(|run| {
                    any = true;
                    run.stack.iter().any(|e| e.tag == append.tag)
                });
            any && all
        });

        let plan = NodeChangePlan {
            append: append_node,
            style_targets,
            class_targets,
            remove_tags,
            strict_remove,
            remove_all,
            toggle_off,
        };
        trace!(toggle_off, remove_all, "node change");

        let mut sel_start: Option<(NodeId, usize)> = None;
        let mut sel_end: Option<(NodeId, usize)> = None;
        for (fmt, runs) in flattened {
            let runs: Vec<Run> = runs
                .into_iter()
                .map(|run| {
                    if run.covered {
                        let stack = transform_stack(&run.stack, &plan);
                        Run { stack, ..run }
                    } else {
                        run
                    }
                })
                .collect();
            self.rebuild_inline(fmt, runs, !plan.remove_tags.is_empty(), &mut sel_start, &mut sel_end);
        }

        let range = match (sel_start, sel_end) {
            (Some((sc, so)), Some((ec, eo))) => Range { sc, so, ec, eo },
            _ => self.initial_caret(),
        };
        self.set_range_internal(range);
        self.history_push();
        Ok(())
    }

    /// Replaces `fmt`'s inline content with `runs`, sharing wrapper chains
    /// between adjacent runs with equal stacks and re-merging equal text
    /// runs. With `keep_boundary_splits`, a covered/uncovered boundary is
    /// kept as separate text nodes.
    fn rebuild_inline(
        &mut self,
        fmt: NodeId,
        runs: Vec<Run>,
        keep_boundary_splits: bool,
        sel_start: &mut Option<(NodeId, usize)>,
        sel_end: &mut Option<(NodeId, usize)>,
    ) {
        self.tree.clear_children(fmt);
        let mut open: Vec<(Element, NodeId)> = Vec::new();
        let mut last_covered: Option<bool> = None;

        for run in runs {
            if let RunContent::Text(text) = &run.content {
                if text.is_empty() {
                    continue;
                }
            }

            let mut common = 0;
            while common < open.len()
                && common < run.stack.len()
                && open[common].0 == run.stack[common]
            {
                common += 1;
            }
            open.truncate(common);
            for element in &run.stack[common..] {
                let id = self.tree.create_element(element.clone());
                let parent = open.last().map(|&(_, id)| id).unwrap_or(fmt);
                let _ = self.tree.append_child(parent, id);
                open.push((element.clone(), id));
            }
            let parent = open.last().map(|&(_, id)| id).unwrap_or(fmt);

            match run.content {
                RunContent::Text(text) => {
                    let merge_target = self
                        .tree
                        .last_child(parent)
                        .filter(|&last| self.tree.is_text(last))
                        .filter(|_| {
                            !(keep_boundary_splits && last_covered != Some(run.covered))
                        });
                    let (node, base) = match merge_target {
                        Some(last) => {
                            let base = self.tree.len(last);
                            if let Some(t) = self.tree.text_mut(last) {
                                t.push_str(&text);
                            }
                            (last, base)
                        }
                        None => {
                            let id = self.tree.create_text(text.clone());
                            let _ = self.tree.append_child(parent, id);
                            (id, 0)
                        }
                    };
                    if run.covered {
                        if sel_start.is_none() {
                            *sel_start = Some((node, base));
                        }
                        *sel_end = Some((node, base + text.len()));
                    }
                    last_covered = Some(run.covered);
                }
                RunContent::Atom(id) => {
                    let _ = self.tree.append_child(parent, id);
                    last_covered = None;
                }
            }
        }
    }
}

/// Flattens the inline content of `fmt` into runs. Empty wrapper elements
/// with no content simply disappear.
fn flatten_inline(tree: &DocumentTree, fmt: NodeId, covered: &BTreeSet<NodeId>) -> Vec<Run> {
    fn walk(
        tree: &DocumentTree,
        node: NodeId,
        stack: &mut Vec<Element>,
        covered: &BTreeSet<NodeId>,
        runs: &mut Vec<Run>,
    ) {
        for &child in tree.children(node) {
            if let Some(text) = tree.text(child) {
                runs.push(Run {
                    content: RunContent::Text(text.to_string()),
                    stack: stack.clone(),
                    covered: covered.contains(&child),
                });
                continue;
            }
            let is_wrapper = tree
                .tag(child)
                .map(|t| tag::is_inline(t) && !tag::is_component(t))
                .unwrap_or(false);
            if is_wrapper {
                let element = tree.element(child).cloned().unwrap_or_default();
                stack.push(element);
                walk(tree, child, stack, covered, runs);
                stack.pop();
            } else {
                runs.push(Run {
                    content: RunContent::Atom(child),
                    stack: stack.clone(),
                    covered: covered.contains(&child),
                });
            }
        }
    }

    let mut runs = Vec::new();
    walk(tree, fmt, &mut Vec::new(), covered, &mut runs);
    runs
}

/// Applies the node-change policy to one wrapper chain.
fn transform_stack(stack: &[Element], plan: &NodeChangePlan<'_>) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::new();
    for entry in stack {
        let mut element = entry.clone();
        let mut stripped = false;
        for property in &plan.style_targets {
            if element.remove_style(property).is_some() {
                stripped = true;
            }
        }
        for class in &plan.class_targets {
            if element.remove_class(class) {
                stripped = true;
            }
        }

        if plan.remove_all {
            continue;
        }
        if plan.remove_tags.contains(&element.tag) {
            // unconditional removal, unless strict mode spares wrappers
            // that still carry styles or classes
            if !plan.strict_remove || element.is_plain() {
                continue;
            }
            out.push(element);
            continue;
        }
        if element.is_plain() {
            let tag_matches_append = plan.append.map(|a| a.tag == element.tag).unwrap_or(false);
            if tag_matches_append || (plan.append.is_none() && stripped) {
                continue;
            }
        }
        out.push(element);
    }

    if let Some(append) = plan.append {
        if plan.toggle_off {
            out.retain(|e| e.tag != append.tag);
        } else if let Some(existing) = out.iter_mut().find(|e| e.tag == append.tag) {
            for (property, value) in &append.styles {
                existing.set_style(property.clone(), value.clone());
            }
            for class in &append.classes {
                existing.add_class(class.clone());
            }
            for (attr, value) in &append.attrs {
                existing.attrs.insert(attr.clone(), value.clone());
            }
        } else {
            out.push(append.clone());
        }
    }
    out
}
