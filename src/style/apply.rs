//! Inline style application.

use tracing::{debug, trace};

use crate::css::StyleSheet;
use crate::dom::{ContentTree, matches_any, parse_selector_list};

/// Selector that addresses the container element itself.
pub const ROOT_SELECTOR: &str = "#wenyan";

/// Write every rule of `sheet` into the inline `style` attributes of the
/// elements it matches.
///
/// Rules are applied strictly in source order and later writes to the same
/// property win; there is no specificity cascade. `!important` flags and
/// custom properties are dropped. A selector that is exactly `#wenyan`
/// targets the root; every other selector is matched against the root's
/// descendants, and selectors that do not parse (pseudo-elements) match
/// nothing.
pub fn apply_styles(sheet: &StyleSheet, tree: &mut ContentTree) {
    let root = tree.root();
    let mut applied = 0usize;

    for rule in sheet.iter() {
        let declarations: Vec<_> = rule
            .declarations
            .iter()
            .filter(|d| !d.property.starts_with("--"))
            .collect();
        if declarations.is_empty() {
            continue;
        }

        for selector in &rule.selectors {
            let targets = if selector == ROOT_SELECTOR {
                vec![root]
            } else {
                let Some(compiled) = parse_selector_list(selector) else {
                    trace!(selector = %selector, "selector does not parse, skipping");
                    continue;
                };
                tree.descendants(root)
                    .into_iter()
                    .filter(|&id| matches_any(tree, id, &compiled))
                    .collect()
            };

            for id in targets {
                tree.update_style(id, |style| {
                    for decl in &declarations {
                        style.set(&decl.property, &decl.value);
                    }
                });
                applied += 1;
            }
        }
    }

    debug!(rules = sheet.len(), applied, "applied inline styles");
}
