use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use vellum_editor::{
    CommandDisplay, EditorError, EditorOptions, EditorPlugin, EditorSession, Element, Event,
    NodeId, PluginCapabilities,
};

fn session(html: &str) -> EditorSession {
    EditorSession::with_contents(html, EditorOptions::default())
}

fn find_text(session: &EditorSession, needle: &str) -> NodeId {
    let tree = session.tree();
    tree.preorder(tree.root())
        .into_iter()
        .find(|&n| tree.text(n).map(|t| t.contains(needle)).unwrap_or(false))
        .expect("text node not found")
}

fn select(session: &mut EditorSession, needle: &str) {
    let node = find_text(session, needle);
    let text = session.tree().text(node).unwrap().to_string();
    let start = text.find(needle).unwrap();
    session
        .set_range(node, start, node, start + needle.len())
        .unwrap();
}

#[derive(Default)]
struct LogPlugin {
    log: Rc<RefCell<Vec<String>>>,
}

impl EditorPlugin for LogPlugin {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities {
            active: true,
            component_info: true,
        }
    }

    fn add(&self, _session: &mut EditorSession) -> Result<(), EditorError> {
        self.log.borrow_mut().push("add".to_string());
        Ok(())
    }

    fn action(
        &self,
        session: &mut EditorSession,
        _args: Option<Value>,
    ) -> Result<(), EditorError> {
        self.log.borrow_mut().push("action".to_string());
        session.node_change(Some(&Element::new("strong")), &[], &[], false)
    }

    fn active(&self, _session: &EditorSession, _node: Option<NodeId>) -> bool {
        self.log.borrow_mut().push("active".to_string());
        true
    }

    fn check_component_info(&self, session: &mut EditorSession) {
        self.log.borrow_mut().push("check".to_string());
        // re-entrant triggers are no-ops while the change is notified
        let _ = session.action_call("bold", CommandDisplay::Command, None);
    }

    fn reset_component_info(&self, _session: &mut EditorSession) {
        self.log.borrow_mut().push("reset".to_string());
    }
}

#[test]
fn register_runs_the_add_initializer() {
    let mut s = session("<p>x</p>");
    let log = Rc::new(RefCell::new(Vec::new()));
    s.register_plugin(Arc::new(LogPlugin { log: log.clone() }))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["add".to_string()]);
    assert_eq!(s.registry().names(), vec!["logger"]);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut s = session("<p>x</p>");
    s.register_plugin(Arc::new(LogPlugin::default())).unwrap();
    assert_eq!(
        s.register_plugin(Arc::new(LogPlugin::default())),
        Err(EditorError::DuplicatePlugin("logger".to_string()))
    );
}

#[test]
fn active_runs_on_every_selection_change() {
    let mut s = session("<p>x</p>");
    let log = Rc::new(RefCell::new(Vec::new()));
    s.register_plugin(Arc::new(LogPlugin { log: log.clone() }))
        .unwrap();
    log.borrow_mut().clear();

    select(&mut s, "x");
    assert!(log.borrow().contains(&"active".to_string()));
    assert_eq!(s.plugin_active_states().len(), 1);
    assert_eq!(
        s.plugin_active_states()[0],
        ("logger".to_string(), true)
    );
}

#[test]
fn component_info_hook_runs_before_the_change_event() {
    let mut s = session("<p>word</p>");
    let log = Rc::new(RefCell::new(Vec::new()));
    s.register_plugin(Arc::new(LogPlugin { log: log.clone() }))
        .unwrap();
    let sink = log.clone();
    s.on_event(move |e| {
        if matches!(e, Event::Change { .. }) {
            sink.borrow_mut().push("change".to_string());
        }
    });
    log.borrow_mut().clear();

    select(&mut s, "word");
    s.node_change(Some(&Element::new("em")), &[], &[], false)
        .unwrap();

    let log = log.borrow();
    let check = log.iter().position(|e| e == "check").expect("check ran");
    let change = log.iter().position(|e| e == "change").expect("change fired");
    assert!(check < change);
}

#[test]
fn reentrant_mutation_from_the_hook_is_dropped() {
    let mut s = session("<p>word</p>");
    s.register_plugin(Arc::new(LogPlugin::default())).unwrap();

    select(&mut s, "word");
    s.node_change(Some(&Element::new("em")), &[], &[], false)
        .unwrap();

    // the hook tried to bold from inside the change notification
    assert_eq!(s.get_contents(), "<p><em>word</em></p>");
}

#[test]
fn submenu_action_call_routes_to_the_plugin() {
    let mut s = session("<p>word</p>");
    let log = Rc::new(RefCell::new(Vec::new()));
    s.register_plugin(Arc::new(LogPlugin { log: log.clone() }))
        .unwrap();
    select(&mut s, "word");

    s.action_call("logger", CommandDisplay::Submenu, None)
        .unwrap();
    assert_eq!(s.submenu_active(), Some("logger"));
    assert!(log.borrow().contains(&"action".to_string()));
    assert_eq!(s.get_contents(), "<p><strong>word</strong></p>");

    // calling again closes the submenu without re-running the action
    let actions_before = log.borrow().iter().filter(|e| *e == "action").count();
    s.action_call("logger", CommandDisplay::Submenu, None)
        .unwrap();
    assert_eq!(s.submenu_active(), None);
    let actions_after = log.borrow().iter().filter(|e| *e == "action").count();
    assert_eq!(actions_before, actions_after);
}

#[test]
fn reset_component_info_runs_on_set_contents() {
    let mut s = session("<p>x</p>");
    let log = Rc::new(RefCell::new(Vec::new()));
    s.register_plugin(Arc::new(LogPlugin { log: log.clone() }))
        .unwrap();
    log.borrow_mut().clear();

    s.set_contents("<p>y</p>").unwrap();
    assert!(log.borrow().contains(&"reset".to_string()));
}
