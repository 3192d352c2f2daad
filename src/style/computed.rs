//! Inherited property lookup against the preview.
//!
//! The preview renders with the theme in a `<style>` element, so the value
//! a reader sees for an inherited property comes from the element's own
//! inline style, then the last matching theme rule, then its ancestors.

use selectors::parser::Selector;

use super::apply::ROOT_SELECTOR;
use crate::css::StyleSheet;
use crate::dom::{ContentTree, NodeId, WenyanSelectors, matches_any, parse_selector_list};

/// Keywords that defer to the parent's value.
const DEFERRING_KEYWORDS: &[&str] = &["inherit", "unset", "currentcolor"];

struct CompiledRule<'a> {
    root_only: bool,
    selectors: Vec<Selector<WenyanSelectors>>,
    value: &'a str,
    important: bool,
}

/// Resolve an inherited property (such as `color`) for `id`.
///
/// Returns `None` when neither the element, its ancestors, nor any rule
/// set the property.
pub fn inherited_value(
    tree: &ContentTree,
    sheet: &StyleSheet,
    id: NodeId,
    property: &str,
) -> Option<String> {
    let rules = compile_rules(sheet, property);
    let mut current = Some(id);

    while let Some(node) = current {
        if !tree.is_element(node) {
            break;
        }
        if let Some(value) = own_value(tree, &rules, node, property)
            && !DEFERRING_KEYWORDS.contains(&value.to_ascii_lowercase().as_str())
        {
            return Some(value);
        }
        current = tree.parent(node);
    }

    None
}

fn compile_rules<'a>(sheet: &'a StyleSheet, property: &str) -> Vec<CompiledRule<'a>> {
    let mut rules = Vec::new();
    for rule in sheet.iter() {
        let Some(decl) = rule.declarations.iter().find(|d| d.property == property) else {
            continue;
        };
        for selector in &rule.selectors {
            if selector == ROOT_SELECTOR {
                rules.push(CompiledRule {
                    root_only: true,
                    selectors: Vec::new(),
                    value: &decl.value,
                    important: decl.important,
                });
            } else if let Some(selectors) = parse_selector_list(selector) {
                rules.push(CompiledRule {
                    root_only: false,
                    selectors,
                    value: &decl.value,
                    important: decl.important,
                });
            }
        }
    }
    rules
}

fn own_value(
    tree: &ContentTree,
    rules: &[CompiledRule<'_>],
    id: NodeId,
    property: &str,
) -> Option<String> {
    let inline = tree.style(id);
    let inline_decl = inline.iter().find(|d| d.property == property);

    let mut winner: Option<&CompiledRule<'_>> = None;
    for rule in rules {
        let matched = if rule.root_only {
            id == tree.root()
        } else {
            matches_any(tree, id, &rule.selectors)
        };
        if matched && (rule.important || !winner.is_some_and(|w| w.important)) {
            winner = Some(rule);
        }
    }

    match (inline_decl, winner) {
        (Some(decl), Some(rule)) if rule.important && !decl.important => {
            Some(rule.value.to_string())
        }
        (Some(decl), _) => Some(decl.value.clone()),
        (None, Some(rule)) => Some(rule.value.to_string()),
        (None, None) => None,
    }
}
