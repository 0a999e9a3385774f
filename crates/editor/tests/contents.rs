use vellum_editor::{
    CharCounterType, EditorError, EditorOptions, EditorSession, NodeId,
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

#[test]
fn contents_round_trip_through_the_whitelist() {
    let s = session("<P CLASS=\"intro\">Hi <SCRIPT>alert(1)</SCRIPT><B>there</B></P>");
    assert_eq!(s.get_contents(), "<p class=\"intro\">Hi <b>there</b></p>");
}

#[test]
fn bare_text_contents_get_a_default_format_wrapper() {
    let s = session("loose text");
    assert_eq!(s.get_contents(), "<p>loose text</p>");
}

#[test]
fn empty_contents_seed_one_empty_format_element() {
    let s = session("");
    assert_eq!(s.get_contents(), "<p></p>");
}

#[test]
fn set_contents_replaces_everything() {
    let mut s = session("<p>old</p>");
    s.set_contents("<h1>new</h1>").unwrap();
    assert_eq!(s.get_contents(), "<h1>new</h1>");
    assert!(s.can_undo());
}

#[test]
fn append_contents_adds_after_the_last_line() {
    let mut s = session("<p>one</p>");
    s.append_contents("<p>two</p>").unwrap();
    assert_eq!(s.get_contents(), "<p>one</p><p>two</p>");
}

#[test]
fn insert_html_at_the_caret_is_sanitized() {
    let mut s = session("<p>ab</p>");
    let text = find_text(&s, "ab");
    s.set_range(text, 1, text, 1).unwrap();
    s.insert_html("x<script>boom()</script>y", false).unwrap();
    assert_eq!(s.get_contents(), "<p>axyb</p>");
}

#[test]
fn insert_html_with_blocks_lands_at_block_level() {
    let mut s = session("<p>ab</p>");
    let text = find_text(&s, "ab");
    s.set_range(text, 2, text, 2).unwrap();
    s.insert_html("<h2>head</h2>", false).unwrap();
    assert_eq!(s.get_contents(), "<p>ab</p><h2>head</h2>");
}

#[test]
fn clean_html_uses_the_paste_whitelist() {
    let options = EditorOptions {
        paste_tags: vec!["p".into(), "strong".into()],
        ..EditorOptions::default()
    };
    let s = EditorSession::with_contents("<p>x</p>", options);
    assert_eq!(
        s.clean_html("<p data-x=\"1\">a<em>b</em><strong>c</strong></p>"),
        "<p data-x=\"1\">ab<strong>c</strong></p>"
    );
}

#[test]
fn char_count_by_counter_type() {
    let s = session("<p>abc</p><p>de</p>");
    assert_eq!(s.get_char_count(Some(CharCounterType::Char)), 5);
    assert_eq!(s.get_char_count(Some(CharCounterType::Byte)), 5);
    assert_eq!(
        s.get_char_count(Some(CharCounterType::ByteHtml)),
        "<p>abc</p><p>de</p>".len()
    );
}

#[test]
fn char_count_counts_characters_not_bytes() {
    let s = session("<p>héé</p>");
    assert_eq!(s.get_char_count(Some(CharCounterType::Char)), 3);
    assert_eq!(s.get_char_count(Some(CharCounterType::Byte)), 5);
}

#[test]
fn insert_html_respects_the_char_limit() {
    let options = EditorOptions {
        max_char_count: Some(5),
        ..EditorOptions::default()
    };
    let mut s = EditorSession::with_contents("<p>abc</p>", options);
    let text = find_text(&s, "abc");
    s.set_range(text, 3, text, 3).unwrap();

    assert_eq!(
        s.insert_html("xyz", false),
        Err(EditorError::CharLimitExceeded { limit: 5 })
    );
    assert_eq!(s.get_contents(), "<p>abc</p>");

    s.insert_html("xy", false).unwrap();
    assert_eq!(s.get_contents(), "<p>abcxy</p>");
}

#[test]
fn code_view_round_trips_through_the_editor_whitelist() {
    let mut s = session("<p>visual</p>");
    s.toggle_code_view();
    assert!(s.is_code_view());
    assert_eq!(s.code_view_source(), Some("<p>visual</p>"));

    s.set_code_view_source("<h2>edited</h2><script>x()</script>");
    s.toggle_code_view();
    assert!(!s.is_code_view());
    assert_eq!(s.get_contents(), "<h2>edited</h2>");
    assert!(s.can_undo());
}

#[test]
fn disabled_sessions_reject_content_mutations() {
    let mut s = session("<p>a</p>");
    s.disable();
    assert_eq!(s.set_contents("<p>b</p>"), Err(EditorError::Disabled));
    assert_eq!(s.insert_html("x", false), Err(EditorError::Disabled));
    s.enable();
    s.set_contents("<p>b</p>").unwrap();
    assert_eq!(s.get_contents(), "<p>b</p>");
}

#[test]
fn destroy_clears_the_session() {
    let mut s = session("<p>gone</p>");
    s.destroy();
    assert!(!s.is_enabled());
    assert!(!s.is_visible());
    assert_eq!(s.get_contents(), "");
    assert!(!s.can_undo());
}
