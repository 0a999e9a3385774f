use serde::{Deserialize, Serialize};

use vellum_dom::tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharCounterType {
    /// Characters of text content.
    Char,
    /// UTF-8 bytes of text content.
    Byte,
    /// UTF-8 bytes of the serialized HTML.
    ByteHtml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// Tag used for new format elements (paragraph lines).
    pub default_tag: String,
    /// Tags allowed in the document; compiled into the editor whitelist.
    pub editor_tags: Vec<String>,
    /// Tags allowed on paste/insert-HTML; compiled into the paste whitelist.
    pub paste_tags: Vec<String>,
    /// Maximum number of undo snapshots kept.
    pub history_depth: usize,
    pub char_counter_type: CharCounterType,
    pub max_char_count: Option<usize>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        let tags: Vec<String> = tag::DEFAULT_EDITOR_TAGS
            .iter()
            .map(|t| t.to_string())
            .collect();
        Self {
            default_tag: tag::DEFAULT_FORMAT.to_string(),
            editor_tags: tags.clone(),
            paste_tags: tags,
            history_depth: 200,
            char_counter_type: CharCounterType::Char,
            max_char_count: None,
        }
    }
}
