//! Ordered property/value maps.
//!
//! The same type backs rule bodies in a [`StyleSheet`](super::StyleSheet)
//! and inline `style` attributes. Setting an existing property overwrites
//! it in place, so the first-insertion position is kept.

use std::fmt;

use crate::patterns::IMPORTANT_RE;

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Insertion-ordered declarations with overwrite-on-duplicate semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the body of a `style` attribute.
    ///
    /// Splits on `;` outside of parentheses and quotes, so data URIs and
    /// quoted `content` values survive. Malformed entries are skipped.
    pub fn parse_inline(text: &str) -> Self {
        let mut block = Self::new();
        for entry in split_top_level(text, ';') {
            let Some((property, value)) = entry.split_once(':') else {
                continue;
            };
            let property = normalize_property(property);
            if property.is_empty() {
                continue;
            }
            let (value, important) = split_important(value);
            if value.is_empty() {
                continue;
            }
            block.insert(property, value.to_string(), important);
        }
        block
    }

    fn insert(&mut self, property: String, value: String, important: bool) {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.property == property)
        {
            Some(existing) => {
                existing.value = value;
                existing.important = important;
            }
            None => self.declarations.push(Declaration {
                property,
                value,
                important,
            }),
        }
    }

    /// Set a property, dropping any `!important` flag it had.
    pub fn set(&mut self, property: &str, value: &str) {
        self.insert(normalize_property(property), value.trim().to_string(), false);
    }

    /// Set a property with the `!important` flag.
    pub fn set_important(&mut self, property: &str, value: &str) {
        self.insert(normalize_property(property), value.trim().to_string(), true);
    }

    /// Set a property only if it is not present yet.
    pub fn set_default(&mut self, property: &str, value: &str) {
        if !self.contains(property) {
            self.set(property, value);
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn remove(&mut self, property: &str) -> Option<Declaration> {
        let index = self
            .declarations
            .iter()
            .position(|d| d.property == property)?;
        Some(self.declarations.remove(index))
    }

    /// Copy every declaration of `other` into `self`, later wins.
    pub fn extend(&mut self, other: &DeclarationBlock) {
        for decl in &other.declarations {
            self.insert(decl.property.clone(), decl.value.clone(), decl.important);
        }
    }

    /// Keep only the declarations for which `keep` returns true.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Declaration) -> bool,
    {
        self.declarations.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize as `a: b; c: d !important;`.
    pub fn to_css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeclarationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {}", decl.property, decl.value)?;
            if decl.important {
                f.write_str(" !important")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DeclarationBlock {
    type Item = &'a Declaration;
    type IntoIter = std::slice::Iter<'a, Declaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.iter()
    }
}

/// Property names are case-insensitive except for custom properties.
fn normalize_property(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    }
}

/// Strip a trailing `!important`, returning the bare value and the flag.
pub(crate) fn split_important(value: &str) -> (&str, bool) {
    let value = value.trim();
    match IMPORTANT_RE.find(value) {
        Some(m) => (value[..m.start()].trim_end(), true),
        None => (value, false),
    }
}

/// Split on `separator` where it is not nested in parentheses or quotes.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_keeps_order() {
        let block = DeclarationBlock::parse_inline("color: red; font-size: 14px;margin:0");
        let props: Vec<_> = block.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, ["color", "font-size", "margin"]);
        assert_eq!(block.get("margin"), Some("0"));
    }

    #[test]
    fn test_duplicate_overwrites_in_place() {
        let mut block = DeclarationBlock::parse_inline("color: red; margin: 0");
        block.set("color", "blue");
        assert_eq!(block.to_css_text(), "color: blue; margin: 0;");
    }

    #[test]
    fn test_important_round_trip() {
        let mut block = DeclarationBlock::new();
        block.set_important("font-family", "serif");
        assert_eq!(block.to_css_text(), "font-family: serif !important;");

        let parsed = DeclarationBlock::parse_inline(&block.to_css_text());
        let decl = parsed.iter().next().unwrap();
        assert!(decl.important);
        assert_eq!(decl.value, "serif");
    }

    #[test]
    fn test_semicolon_inside_url_is_not_a_separator() {
        let block = DeclarationBlock::parse_inline(
            r#"background: url("data:image/svg+xml;utf8,<svg></svg>"); color: red"#,
        );
        assert_eq!(block.len(), 2);
        assert!(block.get("background").unwrap().contains(";utf8,"));
    }

    #[test]
    fn test_custom_property_case_is_kept() {
        let block = DeclarationBlock::parse_inline("--Main: 1px; COLOR: red");
        assert!(block.contains("--Main"));
        assert!(block.contains("color"));
    }

    #[test]
    fn test_remove_and_empty() {
        let mut block = DeclarationBlock::parse_inline("color: red");
        assert!(block.remove("color").is_some());
        assert!(block.is_empty());
        assert_eq!(block.to_css_text(), "");
    }
}
