//! Theme CSS handling.
//!
//! - [`resolve_variables`] flattens custom properties so a theme can be
//!   inlined on platforms without `var()` support.
//! - [`StyleSheet`] is the lenient rule list both the theme and the code
//!   highlight sheet parse into.
//! - [`merge_styles`] joins the two, highlight rules last.

mod declarations;
mod stylesheet;
mod variables;

pub use declarations::{Declaration, DeclarationBlock};
pub use stylesheet::{Rule, StyleSheet};
pub use variables::{VariableTable, resolve_variables};

use tracing::debug;

/// Parse the theme and highlight stylesheets and append the highlight
/// rules after the theme rules.
///
/// Since declarations are later applied in source order, a highlight
/// value wins over a theme value for the same selector and property.
pub fn merge_styles(theme_css: &str, highlight_css: &str) -> StyleSheet {
    let mut merged = StyleSheet::parse(theme_css);
    let highlight = StyleSheet::parse(highlight_css);
    debug!(
        theme_rules = merged.len(),
        highlight_rules = highlight.len(),
        "merged stylesheets"
    );
    merged.append(highlight);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rules_follow_theme_rules() {
        let merged = merge_styles(
            "pre code { color: black; } p { margin: 0 }",
            ".hljs { color: white; }",
        );
        let selectors: Vec<_> = merged.iter().map(Rule::selector_text).collect();
        assert_eq!(selectors, ["pre code", "p", ".hljs"]);
    }

    #[test]
    fn test_empty_sources() {
        assert!(merge_styles("", "").is_empty());
        assert_eq!(merge_styles("p { color: red }", "").len(), 1);
    }
}
