use vellum_dom::{tag, NodeId};

use crate::error::EditorError;
use crate::event::Event;
use crate::selection::Range;
use crate::session::EditorSession;

/// The currently visible controller set: which plugin opened it, which
/// component it is anchored to, and the widget names it shows.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    name: Option<String>,
    target: Option<NodeId>,
    items: Vec<String>,
}

impl ControllerState {
    pub fn is_open(&self) -> bool {
        self.name.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub(crate) fn clear(&mut self) {
        self.name = None;
        self.target = None;
        self.items.clear();
    }
}

impl EditorSession {
    /// Shows a controller set, replacing whatever set is currently open.
    /// Ignored while a mutation is being notified or the editor is
    /// disabled.
    pub fn controllers_on(&mut self, plugin_name: &str, target: NodeId, items: Vec<String>) {
        if self.notifying || !self.is_enabled() {
            return;
        }
        self.controllers.name = Some(plugin_name.to_string());
        self.controllers.target = Some(target);
        self.controllers.items = items;
        self.dispatch(Event::ShowController {
            name: plugin_name.to_string(),
        });
    }

    /// Hides the current controller set and clears its state.
    pub fn controllers_off(&mut self) {
        if self.notifying || !self.controllers.is_open() {
            return;
        }
        self.controllers.clear();
        self.dispatch(Event::HideController);
    }

    pub fn current_controller(&self) -> &ControllerState {
        &self.controllers
    }

    /// Selects a component as a whole and opens its controller.
    pub fn select_component(
        &mut self,
        element: NodeId,
        plugin_name: &str,
    ) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let is_component = self
            .tree()
            .tag(element)
            .map(tag::is_component)
            .unwrap_or(false);
        if !is_component {
            return Err(EditorError::NotAComponent);
        }
        let tree = self.tree();
        let (parent, ix) = match (tree.parent(element), tree.index_in_parent(element)) {
            (Some(parent), Some(ix)) => (parent, ix),
            _ => return Err(EditorError::InvalidRange),
        };
        self.set_range_internal(Range {
            sc: parent,
            so: ix,
            ec: parent,
            eo: ix + 1,
        });
        self.controllers_on(plugin_name, element, vec!["resize".to_string()]);
        Ok(())
    }
}
