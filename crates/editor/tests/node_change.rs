use vellum_editor::{EditorOptions, EditorSession, Element, NodeId};

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

fn select_all(session: &mut EditorSession) {
    let tree = session.tree();
    let texts: Vec<NodeId> = tree
        .preorder(tree.root())
        .into_iter()
        .filter(|&n| tree.is_text(n))
        .collect();
    let first = *texts.first().unwrap();
    let last = *texts.last().unwrap();
    let end = session.tree().len(last);
    session.set_range(first, 0, last, end).unwrap();
}

#[test]
fn bold_wraps_the_selected_word() {
    let mut s = session("<p>Hello world</p>");
    select(&mut s, "world");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p>Hello <strong>world</strong></p>");
}

#[test]
fn bold_applied_twice_toggles_off() {
    let mut s = session("<p>Hello world</p>");
    select(&mut s, "world");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p>Hello <strong>world</strong></p>");

    select(&mut s, "world");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p>Hello world</p>");
}

#[test]
fn selection_follows_the_changed_text() {
    let mut s = session("<p>Hello world</p>");
    select(&mut s, "world");
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();

    let range = s.get_range().unwrap();
    let bold_text = find_text(&s, "world");
    assert_eq!(range.sc, bold_text);
    assert_eq!(range.so, 0);
    assert_eq!(range.ec, bold_text);
    assert_eq!(range.eo, 5);
}

#[test]
fn styled_append_wraps_and_merges_into_same_tag() {
    let mut s = session("<p>one two</p>");
    select(&mut s, "two");
    s.node_change(
        Some(&Element::new("span").with_style("color", "red")),
        &["color"],
        &[],
        false,
    )
    .unwrap();
    assert_eq!(
        s.get_contents(),
        "<p>one <span style=\"color: red;\">two</span></p>"
    );

    // same tag: the attribute is merged, not nested
    select(&mut s, "two");
    s.node_change(
        Some(&Element::new("span").with_style("color", "blue")),
        &["color"],
        &[],
        false,
    )
    .unwrap();
    assert_eq!(
        s.get_contents(),
        "<p>one <span style=\"color: blue;\">two</span></p>"
    );
}

#[test]
fn stripping_the_last_style_unwraps_the_wrapper() {
    let mut s = session("<p>one <span style=\"color: red;\">two</span></p>");
    select(&mut s, "two");
    s.node_change(None, &["color"], &[], false).unwrap();
    assert_eq!(s.get_contents(), "<p>one two</p>");
}

#[test]
fn stripping_one_of_two_styles_keeps_the_wrapper() {
    let mut s = session("<p><span style=\"color: red; font-size: 12px;\">x</span></p>");
    select(&mut s, "x");
    s.node_change(None, &["color"], &[], false).unwrap();
    assert_eq!(
        s.get_contents(),
        "<p><span style=\"font-size: 12px;\">x</span></p>"
    );
}

#[test]
fn untargeted_wrappers_survive_a_style_strip() {
    let mut s = session("<p><strong>bold red</strong></p>");
    select(&mut s, "bold red");
    s.node_change(None, &["color"], &[], false).unwrap();
    // strong never carried the color style, so it stays
    assert_eq!(s.get_contents(), "<p><strong>bold red</strong></p>");
}

#[test]
fn remove_node_array_strips_tags_unconditionally() {
    let mut s = session("<p><span style=\"color: red;\">x</span><span>y</span></p>");
    select_all(&mut s);
    s.node_change(None, &[], &["span"], false).unwrap();
    assert_eq!(s.get_contents(), "<p>xy</p>");
}

#[test]
fn strict_remove_spares_wrappers_that_keep_attributes() {
    let mut s = session("<p><span style=\"color: red;\">x</span><span>y</span></p>");
    select_all(&mut s);
    s.node_change(None, &[], &["span"], true).unwrap();
    assert_eq!(
        s.get_contents(),
        "<p><span style=\"color: red;\">x</span>y</p>"
    );
}

#[test]
fn no_arguments_removes_every_inline_wrapper() {
    let mut s = session("<p><strong>a<em>b</em></strong> c<u>d</u></p>");
    select_all(&mut s);
    s.node_change(None, &[], &[], false).unwrap();
    assert_eq!(s.get_contents(), "<p>ab cd</p>");
}

#[test]
fn class_targets_are_dot_prefixed() {
    let mut s = session("<p><span class=\"hint note\">x</span></p>");
    select(&mut s, "x");
    s.node_change(None, &[".hint"], &[], false).unwrap();
    assert_eq!(s.get_contents(), "<p><span class=\"note\">x</span></p>");
}

#[test]
fn partial_selection_splits_at_the_boundaries() {
    let mut s = session("<p>abcdef</p>");
    let text = find_text(&s, "abcdef");
    s.set_range(text, 2, text, 4).unwrap();
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p>ab<strong>cd</strong>ef</p>");
}

#[test]
fn change_spanning_multiple_formats() {
    let mut s = session("<p>one</p><p>two</p>");
    let one = find_text(&s, "one");
    let two = find_text(&s, "two");
    s.set_range(one, 1, two, 2).unwrap();
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(
        s.get_contents(),
        "<p>o<strong>ne</strong></p><p><strong>tw</strong>o</p>"
    );
}

#[test]
fn subscript_replaces_superscript() {
    let mut s = session("<p><sup>x</sup></p>");
    select(&mut s, "x");
    s.node_change(Some(&Element::new("sub")), &[], &["sup"], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p><sub>x</sub></p>");
}

#[test]
fn caret_node_change_seeds_an_empty_wrapper() {
    let mut s = session("<p>ab</p>");
    let text = find_text(&s, "ab");
    s.set_range(text, 1, text, 1).unwrap();
    s.node_change(Some(&Element::new("strong")), &[], &[], false)
        .unwrap();
    assert_eq!(s.get_contents(), "<p>a<strong></strong>b</p>");

    let range = s.get_range().unwrap();
    assert!(range.is_collapsed());
    let strong = s
        .tree()
        .preorder(s.root())
        .into_iter()
        .find(|&n| s.tree().tag(n) == Some("strong"))
        .unwrap();
    assert_eq!(s.tree().parent(range.sc), Some(strong));
}

#[test]
fn identical_ancestor_formatting_is_left_untouched() {
    let mut s = session("<p><span style=\"color: red;\">word</span></p>");
    let before = s.get_contents();
    select(&mut s, "word");
    s.node_change(
        Some(&Element::new("span").with_style("color", "red")),
        &["color"],
        &[],
        false,
    )
    .unwrap();
    assert_eq!(s.get_contents(), before);
    assert!(!s.can_undo());
}
