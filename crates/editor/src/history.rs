use serde::{Deserialize, Serialize};

use tracing::debug;

use vellum_dom::{parse_fragment, NodeId};

use crate::selection::Range;
use crate::session::EditorSession;

/// A range saved as child-index paths so it survives serialization and
/// re-parse; node ids are not stable across a content restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedRange {
    pub start: SavedPoint,
    pub end: SavedPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    pub contents: String,
    pub range: Option<SavedRange>,
}

/// Snapshot-based undo/redo. The undo stack always holds the current state
/// on top; a push is a no-op when the serialized contents equal the top
/// entry. Every real push clears the redo stack and trims to `depth`.
#[derive(Debug)]
pub(crate) struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            depth: depth.max(2),
        }
    }

    /// Clears both stacks and installs `snapshot` as the base state.
    pub fn seed(&mut self, snapshot: Snapshot) {
        self.undo = vec![snapshot];
        self.redo.clear();
    }

    /// Returns true when a new entry was recorded.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if let Some(top) = self.undo.last() {
            if top.contents == snapshot.contents {
                return false;
            }
        }
        self.undo.push(snapshot);
        self.redo.clear();
        if self.undo.len() > self.depth {
            self.undo.remove(0);
        }
        true
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo.len() < 2 {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        self.undo.last().cloned()
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo.pop()?;
        self.undo.push(snapshot.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

impl EditorSession {
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous snapshot. Silent no-op on an empty stack.
    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            debug!("history undo");
            self.restore_snapshot(&snapshot);
        }
    }

    /// Restores the next snapshot. Silent no-op when nothing was undone.
    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            debug!("history redo");
            self.restore_snapshot(&snapshot);
        }
    }

    /// Clears undo/redo and re-seeds with the current state.
    pub fn reset_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.seed(snapshot);
    }

    /// Captures current contents plus a path-saved range. Pushed by every
    /// mutating operation; fires the change notification exactly once per
    /// recorded entry.
    pub(crate) fn history_push(&mut self) {
        let snapshot = self.snapshot();
        if self.history.push(snapshot) {
            debug!("history push");
            self.notify_change();
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let range = self.range.and_then(|r| {
            let start = self.tree.path_of(r.sc).map(|path| SavedPoint {
                path,
                offset: r.so,
            })?;
            let end = self.tree.path_of(r.ec).map(|path| SavedPoint {
                path,
                offset: r.eo,
            })?;
            Some(SavedRange { start, end })
        });
        Snapshot {
            contents: self.get_contents(),
            range,
        }
    }

    pub(crate) fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        let root = self.tree.root();
        self.tree.clear_children(root);
        parse_fragment(
            &mut self.tree,
            root,
            &snapshot.contents,
            &self.editor_whitelist,
        );
        self.ensure_document_integrity();
        self.controllers_off();

        let range = match &snapshot.range {
            Some(saved) => {
                let (sc, so) = self.resolve_saved_point(&saved.start);
                let (ec, eo) = self.resolve_saved_point(&saved.end);
                Range { sc, so, ec, eo }
            }
            None => self.initial_caret(),
        };
        self.set_range_internal(range);
    }

    /// Resolves a saved path against the current tree, clamping indexes and
    /// falling back to the nearest text position when the exact node is
    /// gone.
    fn resolve_saved_point(&self, point: &SavedPoint) -> (NodeId, usize) {
        let mut current = self.tree.root();
        for &wanted in &point.path {
            let children = self.tree.children(current);
            if children.is_empty() {
                break;
            }
            current = children[wanted.min(children.len() - 1)];
            if self.tree.is_text(current) {
                break;
            }
        }
        if self.tree.is_text(current) {
            (current, self.tree.clamp_text_offset(current, point.offset))
        } else if let Some(text) = self.first_text_descendant(current) {
            (text, 0)
        } else {
            (current, point.offset.min(self.tree.child_count(current)))
        }
    }
}
