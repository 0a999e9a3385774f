use std::cell::RefCell;
use std::rc::Rc;

use vellum_editor::{EditorOptions, EditorSession, Element, Event, NodeId};

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

#[test]
fn undo_restores_pre_mutation_contents_byte_for_byte() {
    let mut s = session("<p>Hello world</p>");
    let before = s.get_contents();
    select(&mut s, "world");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    let after = s.get_contents();
    assert_ne!(before, after);

    s.undo();
    assert_eq!(s.get_contents(), before);

    s.redo();
    assert_eq!(s.get_contents(), after);
}

#[test]
fn undo_restores_the_saved_range() {
    let mut s = session("<p>abc</p>");
    let text = find_text(&s, "abc");
    s.set_range(text, 1, text, 1).unwrap();
    let node = s.create_text("X");
    s.insert_node(node, None).unwrap();
    assert_eq!(s.get_contents(), "<p>aXbc</p>");

    s.undo();
    assert_eq!(s.get_contents(), "<p>abc</p>");
    // the saved range resolves in the restored tree
    let range = s.get_range().unwrap();
    let restored = find_text(&s, "abc");
    assert_eq!(range.sc, restored);
    assert!(range.is_collapsed());
    assert!(range.so <= s.tree().len(restored));

    s.redo();
    let range = s.get_range().unwrap();
    let merged = find_text(&s, "aXbc");
    assert_eq!(range.sc, merged);
    assert_eq!(range.so, 2);
}

#[test]
fn undo_and_redo_on_empty_stacks_are_silent() {
    let mut s = session("<p>x</p>");
    assert!(!s.can_undo());
    assert!(!s.can_redo());
    s.undo();
    s.redo();
    assert_eq!(s.get_contents(), "<p>x</p>");
}

#[test]
fn new_edit_clears_the_redo_stack() {
    let mut s = session("<p>one</p>");
    select(&mut s, "one");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    s.undo();
    assert!(s.can_redo());

    select(&mut s, "one");
    s.node_change(Some(&Element::new("em")), &[], &[], false)
        .unwrap();
    assert!(!s.can_redo());
    assert_eq!(s.get_contents(), "<p><em>one</em></p>");
}

#[test]
fn identical_content_push_is_dropped_and_fires_no_change() {
    let mut s = session("<p>same</p>");
    let events: Rc<RefCell<Vec<Event>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    s.on_event(move |e| sink.borrow_mut().push(e.clone()));

    s.set_contents("<p>same</p>").unwrap();

    let events = events.borrow();
    assert!(!events.iter().any(|e| matches!(e, Event::Change { .. })));
    assert!(events.iter().any(|e| matches!(e, Event::Load { reload: true })));
    assert!(!s.can_undo());
}

#[test]
fn change_fires_exactly_once_per_real_push() {
    let mut s = session("<p>count</p>");
    let changes = Rc::new(RefCell::new(0usize));
    let sink = changes.clone();
    s.on_event(move |e| {
        if matches!(e, Event::Change { .. }) {
            *sink.borrow_mut() += 1;
        }
    });

    select(&mut s, "count");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(*changes.borrow(), 1);

    s.undo();
    assert_eq!(*changes.borrow(), 1);
}

#[test]
fn history_depth_drops_the_oldest_entry() {
    let options = EditorOptions {
        history_depth: 3,
        ..EditorOptions::default()
    };
    let mut s = EditorSession::with_contents("<p>a</p>", options);
    s.append_contents("<p>b</p>").unwrap();
    s.append_contents("<p>c</p>").unwrap();
    s.append_contents("<p>d</p>").unwrap();

    s.undo();
    s.undo();
    s.undo();
    // the oldest state fell off the stack
    assert_eq!(s.get_contents(), "<p>a</p><p>b</p>");
    assert!(!s.can_undo());
}

#[test]
fn reset_history_clears_both_stacks() {
    let mut s = session("<p>r</p>");
    s.append_contents("<p>s</p>").unwrap();
    assert!(s.can_undo());

    s.reset_history();
    assert!(!s.can_undo());
    assert!(!s.can_redo());
    assert_eq!(s.get_contents(), "<p>r</p><p>s</p>");
}
