use std::sync::Arc;

use tracing::debug;

use vellum_dom::{parse_fragment, serialize_children, tag, DocumentTree, Element, NodeId, Whitelist};

use crate::controller::ControllerState;
use crate::error::EditorError;
use crate::event::{Event, Listener};
use crate::history::History;
use crate::options::{CharCounterType, EditorOptions};
use crate::plugin::{EditorPlugin, PluginRegistry};
use crate::selection::Range;
use crate::upload::UploadInfo;

type UploadGate = Box<dyn Fn(&UploadInfo) -> bool>;

/// The editor session: owns the document tree, the active range, history,
/// controllers, plugins, options and mode flags. There is no process-wide
/// state; everything a component needs travels through a `&mut
/// EditorSession`. The session is also the only sanctioned mutation
/// surface — plugins and embedders never touch the tree directly.
pub struct EditorSession {
    pub(crate) tree: DocumentTree,
    pub(crate) range: Option<Range>,
    pub(crate) prev_range: Option<Range>,
    pub(crate) history: History,
    pub(crate) registry: PluginRegistry,
    pub(crate) controllers: ControllerState,
    pub(crate) options: EditorOptions,
    pub(crate) editor_whitelist: Whitelist,
    pub(crate) paste_whitelist: Whitelist,
    pub(crate) listeners: Vec<Listener>,
    pub(crate) upload_gate: Option<UploadGate>,
    pub(crate) active_states: Vec<(String, bool)>,
    pub(crate) submenu_active: Option<String>,
    pub(crate) container_active: Option<String>,
    pub(crate) notifying: bool,
    pub(crate) upload_seq: u64,
    enabled: bool,
    visible: bool,
    code_view: bool,
    code_view_source: Option<String>,
    full_screen: bool,
    show_blocks: bool,
    has_focus: bool,
}

impl EditorSession {
    pub fn new(options: EditorOptions) -> Self {
        Self::with_contents("", options)
    }

    pub fn with_contents(html: &str, options: EditorOptions) -> Self {
        let editor_whitelist = Whitelist::new(&options.editor_tags);
        let paste_whitelist = Whitelist::new(&options.paste_tags);
        let mut session = Self {
            tree: DocumentTree::new(),
            range: None,
            prev_range: None,
            history: History::new(options.history_depth),
            registry: PluginRegistry::default(),
            controllers: ControllerState::default(),
            editor_whitelist,
            paste_whitelist,
            options,
            listeners: Vec::new(),
            upload_gate: None,
            active_states: Vec::new(),
            submenu_active: None,
            container_active: None,
            notifying: false,
            upload_seq: 0,
            enabled: true,
            visible: true,
            code_view: false,
            code_view_source: None,
            full_screen: false,
            show_blocks: false,
            has_focus: false,
        };
        let root = session.tree.root();
        parse_fragment(&mut session.tree, root, html, &session.editor_whitelist);
        session.ensure_document_integrity();
        let caret = session.initial_caret();
        session.set_range_internal(caret);
        session.reset_history();
        session.dispatch(Event::Load { reload: false });
        session
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Creates a detached element for a later `insert_node` /
    /// `insert_component` call.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.tree.create_element(element)
    }

    /// Creates a detached text node for a later `insert_node` call.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.tree.create_text(text)
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Registers a plugin and runs its `add` initializer.
    pub fn register_plugin(&mut self, plugin: Arc<dyn EditorPlugin>) -> Result<(), EditorError> {
        self.registry.register(plugin.clone())?;
        plugin.add(self)
    }

    /// Latest `active` results of capability-declaring plugins, refreshed
    /// on every selection change.
    pub fn plugin_active_states(&self) -> &[(String, bool)] {
        &self.active_states
    }

    pub fn on_event(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_upload_gate(&mut self, gate: impl Fn(&UploadInfo) -> bool + 'static) {
        self.upload_gate = Some(Box::new(gate));
    }

    pub(crate) fn dispatch(&mut self, event: Event) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener(&event);
        }
        let added = std::mem::replace(&mut self.listeners, listeners);
        self.listeners.extend(added);
    }

    /// Runs component-info hooks and fires `Change`. Re-entrant calls are
    /// dropped, which is what keeps hook-triggered mutations from
    /// recursing.
    pub(crate) fn notify_change(&mut self) {
        if self.notifying {
            return;
        }
        self.notifying = true;
        let plugins = self.registry.component_info_plugins();
        for plugin in &plugins {
            plugin.check_component_info(self);
        }
        let contents = self.get_contents();
        self.dispatch(Event::Change { contents });
        self.notifying = false;
    }

    pub(crate) fn set_range_internal(&mut self, range: Range) {
        let mut range = range;
        if let (Some(start), Some(end)) = (
            self.sel_key(range.sc, range.so),
            self.sel_key(range.ec, range.eo),
        ) {
            if start > end {
                range = Range {
                    sc: range.ec,
                    so: range.eo,
                    ec: range.sc,
                    eo: range.so,
                };
            }
        }
        self.prev_range = self.range;
        self.range = Some(range);
        self.after_selection_change();
    }

    fn after_selection_change(&mut self) {
        if let Some(target) = self.controllers.target() {
            if !self.node_intersects_selection(target) {
                self.controllers_off();
            }
        }
        let node = self.range.map(|r| r.ec);
        let plugins = self.registry.active_plugins();
        self.active_states = plugins
            .iter()
            .map(|p| (p.name().to_string(), p.active(self, node)))
            .collect();
    }

    pub(crate) fn node_intersects_selection(&self, node: NodeId) -> bool {
        let Some(r) = self.range else {
            return false;
        };
        let (Some(start_key), Some(end_key)) =
            (self.sel_key(r.sc, r.so), self.sel_key(r.ec, r.eo))
        else {
            return false;
        };
        let Some(path) = self.tree.path_of(node) else {
            return false;
        };
        let mut node_end = path.clone();
        node_end.push(usize::MAX);
        path <= end_key && start_key <= node_end
    }

    pub(crate) fn initial_caret(&self) -> Range {
        let root = self.tree.root();
        if let Some(text) = self.first_text_descendant(root) {
            return Range::collapsed(text, 0);
        }
        let first_fmt = self
            .tree
            .preorder(root)
            .into_iter()
            .find(|&n| self.is_format_element(n));
        match first_fmt {
            Some(fmt) => Range::collapsed(fmt, 0),
            None => Range::collapsed(root, 0),
        }
    }

    // ---- contents -------------------------------------------------------

    /// Serialized document contents.
    pub fn get_contents(&self) -> String {
        serialize_children(&self.tree, self.tree.root())
    }

    /// Replaces the document with `html`, sanitized against the editor
    /// whitelist.
    pub fn set_contents(&mut self, html: &str) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let root = self.tree.root();
        self.tree.clear_children(root);
        parse_fragment(&mut self.tree, root, html, &self.editor_whitelist);
        self.ensure_document_integrity();
        let caret = self.initial_caret();
        self.set_range_internal(caret);
        let plugins = self.registry.component_info_plugins();
        for plugin in &plugins {
            plugin.reset_component_info(self);
        }
        self.history_push();
        self.dispatch(Event::Load { reload: true });
        Ok(())
    }

    /// Appends `html` after the last format element.
    pub fn append_contents(&mut self, html: &str) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let root = self.tree.root();
        parse_fragment(&mut self.tree, root, html, &self.editor_whitelist);
        self.ensure_document_integrity();
        self.history_push();
        Ok(())
    }

    /// Inserts HTML at the caret. Content is cleaned against the paste
    /// whitelist unless `not_cleaning` asks for the editor whitelist.
    pub fn insert_html(&mut self, html: &str, not_cleaning: bool) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let whitelist = if not_cleaning {
            self.editor_whitelist.clone()
        } else {
            self.paste_whitelist.clone()
        };
        let container = self.tree.create_element(Element::new("div"));
        parse_fragment(&mut self.tree, container, html, &whitelist);
        let added = self.tree.text_content(container);
        if !self.check_char_count(&added) {
            let limit = self.options.max_char_count.unwrap_or(0);
            return Err(EditorError::CharLimitExceeded { limit });
        }
        let nodes = self.tree.clear_children(container);
        for node in nodes {
            self.insert_node_no_push(node, None)?;
        }
        self.ensure_document_integrity();
        self.history_push();
        Ok(())
    }

    /// Sanitizes arbitrary HTML against the paste whitelist.
    pub fn clean_html(&self, html: &str) -> String {
        vellum_dom::clean(html, &self.paste_whitelist)
    }

    pub fn get_char_count(&self, counter: Option<CharCounterType>) -> usize {
        let kind = counter.unwrap_or(self.options.char_counter_type);
        match kind {
            CharCounterType::Char => self.tree.text_content(self.tree.root()).chars().count(),
            CharCounterType::Byte => self.tree.text_content(self.tree.root()).len(),
            CharCounterType::ByteHtml => self.get_contents().len(),
        }
    }

    /// Whether `added` text still fits under `max_char_count`.
    pub fn check_char_count(&self, added: &str) -> bool {
        match self.options.max_char_count {
            Some(max) => {
                let added = match self.options.char_counter_type {
                    CharCounterType::Char => added.chars().count(),
                    CharCounterType::Byte | CharCounterType::ByteHtml => added.len(),
                };
                self.get_char_count(None) + added <= max
            }
            None => true,
        }
    }

    // ---- focus and lifecycle -------------------------------------------

    pub fn focus(&mut self) {
        self.has_focus = true;
        if self.range.is_none() {
            let caret = self.initial_caret();
            self.set_range_internal(caret);
        }
        self.dispatch(Event::Focus);
    }

    pub fn blur(&mut self) {
        self.has_focus = false;
        self.controllers_off();
        self.dispatch(Event::Blur);
    }

    /// Moves focus to the edge of `node`: a component is selected whole,
    /// anything else gets the caret after its last text. `None` focuses
    /// the end of the document.
    pub fn focus_edge(&mut self, node: Option<NodeId>) -> Result<(), EditorError> {
        let Some(node) = node else {
            let (container, offset) = self.document_end_point();
            let caret = match self.last_text_descendant(container) {
                Some(text) => Range::collapsed(text, self.tree.len(text)),
                None => Range::collapsed(container, offset),
            };
            self.set_range_internal(caret);
            return Ok(());
        };

        let component = std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .filter(|&a| self.tree.tag(a).map(tag::is_component).unwrap_or(false))
            .last();
        if let Some(component) = component {
            let plugin = self
                .tree
                .tag(component)
                .and_then(tag::component_plugin)
                .unwrap_or("component");
            return self.select_component(component, plugin);
        }
        let caret = match self.last_text_descendant(node) {
            Some(text) => Range::collapsed(text, self.tree.len(text)),
            None => Range::collapsed(node, self.tree.len(node)),
        };
        self.set_range_internal(caret);
        Ok(())
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.controllers_off();
        self.submenu_active = None;
        self.container_active = None;
        self.enabled = false;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Tears the session down: contents, history, controllers and
    /// listeners are dropped and the session is disabled.
    pub fn destroy(&mut self) {
        let root = self.tree.root();
        self.tree.clear_children(root);
        self.range = None;
        self.prev_range = None;
        self.controllers.clear();
        self.listeners.clear();
        self.upload_gate = None;
        self.active_states.clear();
        self.submenu_active = None;
        self.container_active = None;
        self.code_view_source = None;
        self.reset_history();
        self.enabled = false;
        self.visible = false;
        debug!("session destroyed");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn submenu_active(&self) -> Option<&str> {
        self.submenu_active.as_deref()
    }

    pub fn container_active(&self) -> Option<&str> {
        self.container_active.as_deref()
    }

    // ---- view modes ----------------------------------------------------

    pub fn is_code_view(&self) -> bool {
        self.code_view
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn is_show_blocks(&self) -> bool {
        self.show_blocks
    }

    /// Switches between wysiwyg and source editing. Entering code view
    /// freezes the serialized contents for source editing; leaving re-parses
    /// the (possibly edited) source through the editor whitelist.
    pub fn toggle_code_view(&mut self) {
        if self.code_view {
            let source = self.code_view_source.take().unwrap_or_default();
            let root = self.tree.root();
            self.tree.clear_children(root);
            parse_fragment(&mut self.tree, root, &source, &self.editor_whitelist);
            self.ensure_document_integrity();
            let caret = self.initial_caret();
            self.set_range_internal(caret);
            self.code_view = false;
            self.history_push();
            self.dispatch(Event::CodeView { enabled: false });
        } else {
            self.code_view_source = Some(self.get_contents());
            self.code_view = true;
            self.dispatch(Event::CodeView { enabled: true });
        }
    }

    /// Replaces the source text while in code view.
    pub fn set_code_view_source(&mut self, source: impl Into<String>) {
        if self.code_view {
            self.code_view_source = Some(source.into());
        }
    }

    pub fn code_view_source(&self) -> Option<&str> {
        self.code_view_source.as_deref()
    }

    pub fn toggle_full_screen(&mut self) {
        self.full_screen = !self.full_screen;
        self.dispatch(Event::FullScreen {
            enabled: self.full_screen,
        });
    }

    pub fn toggle_display_blocks(&mut self) {
        self.show_blocks = !self.show_blocks;
        self.dispatch(Event::ShowBlocks {
            enabled: self.show_blocks,
        });
    }
}
