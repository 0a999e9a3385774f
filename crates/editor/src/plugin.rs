use std::sync::Arc;

use serde_json::Value;

use vellum_dom::NodeId;

use crate::error::EditorError;
use crate::session::EditorSession;

/// Capabilities a plugin declares at registration. The registry keeps a
/// tagged list per capability instead of probing for methods at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    /// `active` is consulted on every selection change (toolbar state).
    pub active: bool,
    /// `check_component_info`/`reset_component_info` hooks run around
    /// content-change notification.
    pub component_info: bool,
}

/// The closed plugin interface. Plugins never mutate the document tree
/// directly; everything goes through the [`EditorSession`] they are handed.
pub trait EditorPlugin {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities::default()
    }

    /// Called once when the plugin is registered with a session.
    fn add(&self, _session: &mut EditorSession) -> Result<(), EditorError> {
        Ok(())
    }

    /// Invoked by the command dispatcher for submenu/dialog/container
    /// commands routed to this plugin.
    fn action(
        &self,
        _session: &mut EditorSession,
        _args: Option<Value>,
    ) -> Result<(), EditorError> {
        Ok(())
    }

    /// Whether the plugin's toolbar button should render active for the
    /// given selection node.
    fn active(&self, _session: &EditorSession, _node: Option<NodeId>) -> bool {
        false
    }

    /// Runs just before every content-change notification.
    fn check_component_info(&self, _session: &mut EditorSession) {}

    fn reset_component_info(&self, _session: &mut EditorSession) {}
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn EditorPlugin>>,
    active: Vec<usize>,
    component_info: Vec<usize>,
}

impl PluginRegistry {
    pub fn register(&mut self, plugin: Arc<dyn EditorPlugin>) -> Result<(), EditorError> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(EditorError::DuplicatePlugin(plugin.name().to_string()));
        }
        let capabilities = plugin.capabilities();
        let ix = self.plugins.len();
        if capabilities.active {
            self.active.push(ix);
        }
        if capabilities.component_info {
            self.component_info.push(ix);
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn EditorPlugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn active_plugins(&self) -> Vec<Arc<dyn EditorPlugin>> {
        self.active
            .iter()
            .map(|&ix| self.plugins[ix].clone())
            .collect()
    }

    pub fn component_info_plugins(&self) -> Vec<Arc<dyn EditorPlugin>> {
        self.component_info
            .iter()
            .map(|&ix| self.plugins[ix].clone())
            .collect()
    }
}
