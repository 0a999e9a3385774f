use regex::Regex;

use crate::tag;

/// Allowed-tag whitelist, precompiled from an option-supplied tag list.
#[derive(Debug, Clone)]
pub struct Whitelist {
    tags: Vec<String>,
    pattern: Regex,
}

impl Whitelist {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let tag: String = tag
                .as_ref()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            if !tag.is_empty() && !normalized.iter().any(|t| t == &tag) {
                normalized.push(tag);
            }
        }
        let pattern = format!("^(?:{})$", normalized.join("|"));
        let pattern = Regex::new(&pattern).expect("whitelist pattern must compile");
        Self {
            tags: normalized,
            pattern,
        }
    }

    pub fn default_editor() -> Self {
        Self::new(tag::DEFAULT_EDITOR_TAGS.iter().copied())
    }

    pub fn allows(&self, tag: &str) -> bool {
        !self.tags.is_empty() && self.pattern.is_match(tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}
