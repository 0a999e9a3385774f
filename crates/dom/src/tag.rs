//! Tag taxonomy for the editable document model.
//!
//! A "format" element is a block that directly holds content (paragraph,
//! heading, list item). A "range" element is a block container that wraps
//! format elements (blockquote, list, table). A "component" is an atomic
//! non-text unit that is selected as a whole and drives a controller.

pub const DEFAULT_FORMAT: &str = "p";

pub const DEFAULT_EDITOR_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "pre", "table",
    "thead", "tbody", "tr", "th", "td", "a", "b", "strong", "i", "em", "u", "ins", "s", "strike",
    "del", "sub", "sup", "span", "code", "label", "br", "hr", "img", "iframe", "video", "figure",
    "figcaption",
];

pub fn is_format(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "th" | "td" | "pre"
    )
}

pub fn is_range(tag: &str) -> bool {
    matches!(
        tag,
        "blockquote" | "ol" | "ul" | "table" | "thead" | "tbody" | "tfoot" | "tr" | "figure"
    )
}

pub fn is_list(tag: &str) -> bool {
    matches!(tag, "ol" | "ul")
}

pub fn is_component(tag: &str) -> bool {
    matches!(tag, "img" | "iframe" | "video" | "table" | "hr")
}

pub fn is_inline(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "b"
            | "strong"
            | "i"
            | "em"
            | "u"
            | "ins"
            | "s"
            | "strike"
            | "del"
            | "sub"
            | "sup"
            | "span"
            | "code"
            | "label"
    )
}

pub fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input" | "source")
}

/// The plugin conventionally responsible for a component tag.
pub fn component_plugin(tag: &str) -> Option<&'static str> {
    match tag {
        "img" => Some("image"),
        "iframe" | "video" => Some("video"),
        "table" => Some("table"),
        "hr" => Some("horizontalRule"),
        _ => None,
    }
}
