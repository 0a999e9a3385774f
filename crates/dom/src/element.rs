use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An element's tag plus its presentation attributes. The `class` and
/// `style` attributes are kept in structured form; everything else stays in
/// `attrs`. Styles are ordered by property name so serialization is
/// canonical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: tag.as_ref().to_ascii_lowercase(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.styles.insert(property.into(), value.into());
    }

    pub fn remove_style(&mut self, property: &str) -> Option<String> {
        self.styles.remove(property)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    /// True when the element carries no styles and no classes.
    pub fn is_plain(&self) -> bool {
        self.styles.is_empty() && self.classes.is_empty()
    }

    /// The serialized `style` attribute value, if any styles are set.
    pub fn style_attr(&self) -> Option<String> {
        if self.styles.is_empty() {
            return None;
        }
        let mut out = String::new();
        for (property, value) in &self.styles {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(property);
            out.push_str(": ");
            out.push_str(value);
            out.push(';');
        }
        Some(out)
    }

    /// The serialized `class` attribute value, if any classes are set.
    pub fn class_attr(&self) -> Option<String> {
        if self.classes.is_empty() {
            return None;
        }
        Some(self.classes.join(" "))
    }

    pub fn parse_style_attr(value: &str) -> BTreeMap<String, String> {
        let mut styles = BTreeMap::new();
        for declaration in value.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if !property.is_empty() && !value.is_empty() {
                styles.insert(property, value);
            }
        }
        styles
    }

    pub fn parse_class_attr(value: &str) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for class in value.split_ascii_whitespace() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        classes
    }
}
