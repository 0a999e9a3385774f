//! Lenient HTML parsing and canonical serialization for the editable
//! document model.
//!
//! The parser is a small hand-rolled tokenizer: it tolerates unclosed and
//! mismatched tags, drops comments and doctypes, and sanitizes against a
//! [`Whitelist`] — a disallowed element is removed while its children are
//! promoted to its position (`script`/`style` payloads are dropped whole).
//! Whitespace-only text nodes are discarded.
//!
//! Serialization is canonical: lowercase tags, `class` then `style` then the
//! remaining attributes in sorted order. Parsing the serializer's output and
//! serializing again yields the same bytes, which is what content
//! comparison in the history stack relies on.

use tracing::trace;

use crate::element::Element;
use crate::tag;
use crate::tree::{DocumentTree, NodeId};
use crate::whitelist::Whitelist;

/// Parses `html` and appends the resulting nodes under `parent`.
pub fn parse_fragment(tree: &mut DocumentTree, parent: NodeId, html: &str, whitelist: &Whitelist) {
    let mut parser = Parser {
        tree,
        whitelist,
        base: parent,
        open: Vec::new(),
        text: String::new(),
    };
    parser.run(html);
}

/// Sanitizes `html` against `whitelist` and returns the canonical form.
pub fn clean(html: &str, whitelist: &Whitelist) -> String {
    let mut scratch = DocumentTree::new();
    let root = scratch.root();
    parse_fragment(&mut scratch, root, html, whitelist);
    serialize_children(&scratch, root)
}

struct OpenTag {
    name: String,
    node: Option<NodeId>,
}

struct Parser<'a> {
    tree: &'a mut DocumentTree,
    whitelist: &'a Whitelist,
    base: NodeId,
    open: Vec<OpenTag>,
    text: String,
}

impl Parser<'_> {
    fn run(&mut self, s: &str) {
        let mut i = 0;
        while i < s.len() {
            let rest = &s[i..];
            if rest.starts_with("<!--") {
                self.flush_text();
                i += rest.find("-->").map(|p| p + 3).unwrap_or(rest.len());
            } else if rest.starts_with("</") {
                self.flush_text();
                let (name, consumed) = read_close_tag(rest);
                if !name.is_empty() {
                    self.close_tag(&name);
                }
                i += consumed;
            } else if rest.starts_with("<!") {
                self.flush_text();
                i += rest.find('>').map(|p| p + 1).unwrap_or(rest.len());
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.flush_text();
                let (name, attrs, self_closing, consumed) = read_open_tag(rest);
                i += consumed;
                if !self.whitelist.allows(&name) && matches!(name.as_str(), "script" | "style") {
                    // Raw-text payload of a dropped tag is dropped with it.
                    let close = format!("</{name}");
                    let lower = s[i..].to_ascii_lowercase();
                    match lower.find(&close) {
                        Some(p) => {
                            let after = i + p;
                            i = after
                                + s[after..]
                                    .find('>')
                                    .map(|q| q + 1)
                                    .unwrap_or(s.len() - after);
                        }
                        None => i = s.len(),
                    }
                    trace!(tag = %name, "dropped raw-text tag");
                    continue;
                }
                self.open_tag(name, attrs, self_closing);
            } else {
                let consumed = self.push_char(rest);
                i += consumed;
            }
        }
        self.flush_text();
    }

    fn push_char(&mut self, rest: &str) -> usize {
        if rest.starts_with('&') {
            if let Some((ch, consumed)) = decode_entity(rest) {
                self.text.push(ch);
                return consumed;
            }
        }
        let ch = rest.chars().next().unwrap_or('\u{fffd}');
        self.text.push(ch);
        ch.len_utf8()
    }

    fn current_parent(&self) -> NodeId {
        self.open
            .iter()
            .rev()
            .find_map(|o| o.node)
            .unwrap_or(self.base)
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if text.chars().all(char::is_whitespace) {
            return;
        }
        let parent = self.current_parent();
        if let Some(last) = self.tree.last_child(parent) {
            if let Some(existing) = self.tree.text_mut(last) {
                existing.push_str(&text);
                return;
            }
        }
        let node = self.tree.create_text(text);
        let _ = self.tree.append_child(parent, node);
    }

    fn open_tag(&mut self, name: String, attrs: Vec<(String, String)>, self_closing: bool) {
        let leaf = self_closing || tag::is_void(&name);
        if !self.whitelist.allows(&name) {
            trace!(tag = %name, "dropped disallowed tag");
            if !leaf {
                self.open.push(OpenTag { name, node: None });
            }
            return;
        }

        let mut element = Element::new(&name);
        for (attr, value) in attrs {
            match attr.as_str() {
                "class" => element.classes = Element::parse_class_attr(&value),
                "style" => element.styles = Element::parse_style_attr(&value),
                _ => {
                    element.attrs.insert(attr, value);
                }
            }
        }
        let node = self.tree.create_element(element);
        let parent = self.current_parent();
        let _ = self.tree.append_child(parent, node);
        if !leaf {
            self.open.push(OpenTag {
                name,
                node: Some(node),
            });
        }
    }

    fn close_tag(&mut self, name: &str) {
        if let Some(pos) = self.open.iter().rposition(|o| o.name == name) {
            self.open.truncate(pos);
        }
    }
}

fn read_close_tag(rest: &str) -> (String, usize) {
    // rest starts with "</".
    let mut name = String::new();
    let mut i = 2;
    for ch in rest[2..].chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_lowercase());
            i += ch.len_utf8();
        } else {
            break;
        }
    }
    let end = rest[i..].find('>').map(|p| i + p + 1).unwrap_or(rest.len());
    (name, end)
}

fn read_open_tag(rest: &str) -> (String, Vec<(String, String)>, bool, usize) {
    // rest starts with "<" followed by an ascii letter.
    let bytes = rest.as_bytes();
    let mut i = 1;
    let mut name = String::new();
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        name.push(bytes[i].to_ascii_lowercase() as char);
        i += 1;
    }

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' {
            self_closing = true;
            i += 1;
            continue;
        }

        let attr_start = i;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'>' | b'/' ) && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let attr = rest[attr_start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = decode_entities(&rest[value_start..i]);
                if i < bytes.len() {
                    i += 1;
                }
            } else {
                let value_start = i;
                while i < bytes.len() && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = decode_entities(&rest[value_start..i]);
            }
        }
        if !attr.is_empty() {
            attrs.push((attr, value));
        }
    }

    (name, attrs, self_closing, i)
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with('&') {
            if let Some((ch, consumed)) = decode_entity(rest) {
                out.push(ch);
                i += consumed;
                continue;
            }
        }
        let ch = rest.chars().next().unwrap_or('\u{fffd}');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn decode_entity(rest: &str) -> Option<(char, usize)> {
    for (entity, ch) in [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&#39;", '\''),
        ("&nbsp;", '\u{a0}'),
    ] {
        if rest.starts_with(entity) {
            return Some((ch, entity.len()));
        }
    }
    if let Some(tail) = rest.strip_prefix("&#") {
        let (digits, radix) = match tail.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16),
            None => (tail, 10),
        };
        let len = digits
            .chars()
            .take_while(|c| c.is_digit(radix))
            .map(char::len_utf8)
            .sum::<usize>();
        if len == 0 || !digits[len..].starts_with(';') {
            return None;
        }
        let code = u32::from_str_radix(&digits[..len], radix).ok()?;
        let ch = char::from_u32(code)?;
        let prefix = rest.len() - tail.len();
        let radix_marker = if radix == 16 { 1 } else { 0 };
        return Some((ch, prefix + radix_marker + len + 1));
    }
    None
}

/// Serializes the subtree rooted at `id`, including `id` itself.
pub fn serialize_node(tree: &DocumentTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

/// Serializes the children of `id` — the `innerHTML` form.
pub fn serialize_children(tree: &DocumentTree, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_node(tree: &DocumentTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        crate::tree::NodeKind::Text(t) => escape_text(t, out),
        crate::tree::NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            if let Some(class) = el.class_attr() {
                out.push_str(" class=\"");
                escape_attr(&class, out);
                out.push('"');
            }
            if let Some(style) = el.style_attr() {
                out.push_str(" style=\"");
                escape_attr(&style, out);
                out.push('"');
            }
            for (attr, value) in &el.attrs {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if tag::is_void(&el.tag) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
