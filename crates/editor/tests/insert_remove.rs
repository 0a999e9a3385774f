use vellum_editor::{EditorOptions, EditorSession, Element, MergedOffsets, NodeId};

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

fn find_tag(session: &EditorSession, tag: &str) -> NodeId {
    let tree = session.tree();
    tree.preorder(tree.root())
        .into_iter()
        .find(|&n| tree.tag(n) == Some(tag))
        .expect("element not found")
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
fn inserting_text_at_caret_merges_both_sides() {
    let mut s = session("<p>ab</p>");
    let text = find_text(&s, "ab");
    s.set_range(text, 1, text, 1).unwrap();

    let node = s.create_text("X");
    let merged = s.insert_node(node, None).unwrap();

    assert_eq!(
        merged,
        Some(MergedOffsets {
            start_offset: 1,
            end_offset: 2
        })
    );
    assert_eq!(s.get_contents(), "<p>aXb</p>");
    let p = find_tag(&s, "p");
    assert_eq!(s.tree().child_count(p), 1);
}

#[test]
fn inserting_text_at_text_start_merges_forward() {
    let mut s = session("<p>bc</p>");
    let text = find_text(&s, "bc");
    s.set_range(text, 0, text, 0).unwrap();

    let node = s.create_text("a");
    let merged = s.insert_node(node, None).unwrap();

    assert_eq!(
        merged,
        Some(MergedOffsets {
            start_offset: 0,
            end_offset: 1
        })
    );
    assert_eq!(s.get_contents(), "<p>abc</p>");
}

#[test]
fn inserting_element_after_node_is_pure_insertion() {
    let mut s = session("<p>a</p><p>b</p>");
    let first = find_tag(&s, "p");

    let img = s.create_element(Element::new("img").with_attr("src", "x.png"));
    let merged = s.insert_node(img, Some(first)).unwrap();

    assert_eq!(merged, None);
    assert_eq!(s.get_contents(), "<p>a</p><img src=\"x.png\"><p>b</p>");
}

#[test]
fn insert_replaces_selected_content_first() {
    let mut s = session("<p>hello</p>");
    select(&mut s, "ell");

    let node = s.create_text("u");
    s.insert_node(node, None).unwrap();

    assert_eq!(s.get_contents(), "<p>huo</p>");
}

#[test]
fn inserted_text_at_root_level_gets_a_format_wrapper() {
    let mut s = session("");
    let root = s.root();
    s.set_range(root, 0, root, 0).unwrap();

    let node = s.create_text("loose");
    s.insert_node(node, None).unwrap();

    let text = find_text(&s, "loose");
    let parent = s.tree().parent(text).unwrap();
    assert_eq!(s.tree().tag(parent), Some("p"));
}

#[test]
fn remove_within_a_single_text_node() {
    let mut s = session("<p>abcd</p>");
    let text = find_text(&s, "abcd");
    s.set_range(text, 1, text, 3).unwrap();

    let removed = s.remove_node().unwrap();

    assert_eq!(s.get_contents(), "<p>ad</p>");
    assert_eq!(removed.container, text);
    assert_eq!(removed.offset, 1);
    assert_eq!(removed.prev_container, None);
}

#[test]
fn remove_across_formats_splits_boundaries() {
    let mut s = session("<p>first</p><p>middle</p><p>last</p>");
    let first = find_text(&s, "first");
    let last = find_text(&s, "last");
    s.set_range(first, 3, last, 2).unwrap();

    s.remove_node().unwrap();

    assert_eq!(s.get_contents(), "<p>fir</p><p>st</p>");
}

#[test]
fn remove_everything_leaves_one_empty_format_element() {
    let mut s = session("<p>a</p><blockquote><p>b</p></blockquote><p>c</p>");
    let first = find_text(&s, "a");
    let last = find_text(&s, "c");
    s.set_range(first, 0, last, 1).unwrap();

    s.remove_node().unwrap();

    assert_eq!(s.get_contents(), "<p></p>");
    let formats: Vec<_> = s
        .tree()
        .preorder(s.root())
        .into_iter()
        .filter(|&n| s.tree().tag(n) == Some("p"))
        .collect();
    assert_eq!(formats.len(), 1);
}

#[test]
fn remove_reports_previous_sibling_when_format_is_emptied() {
    let mut s = session("<p>keep</p><p>gone</p><p>tail</p>");
    let gone = find_text(&s, "gone");
    let tail = find_text(&s, "tail");
    s.set_range(gone, 0, tail, 2).unwrap();

    let removed = s.remove_node().unwrap();

    assert_eq!(s.get_contents(), "<p>keep</p><p>il</p>");
    let keep = find_tag(&s, "p");
    assert_eq!(removed.prev_container, Some(keep));
}

#[test]
fn collapsed_remove_is_a_no_op() {
    let mut s = session("<p>ab</p>");
    let text = find_text(&s, "ab");
    s.set_range(text, 1, text, 1).unwrap();

    let removed = s.remove_node().unwrap();

    assert_eq!(s.get_contents(), "<p>ab</p>");
    assert_eq!(removed.container, text);
    assert_eq!(removed.offset, 1);
    assert!(!s.can_undo());
}

#[test]
fn append_format_tag_creates_named_sibling() {
    let mut s = session("<h2>title</h2>");
    let heading = find_tag(&s, "h2");

    let same = s.append_format_tag(heading, None).unwrap();
    assert_eq!(s.tree().tag(same), Some("h2"));

    let named = s.append_format_tag(heading, Some("p")).unwrap();
    assert_eq!(s.tree().tag(named), Some("p"));
    assert_eq!(s.get_contents(), "<h2>title</h2><p></p><h2></h2>");
}
