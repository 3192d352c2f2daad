//! List item rewrites.

use tracing::debug;

use crate::dom::{ContentTree, NodeId, select};

/// Move every sibling after `node` into a new `<tag style="...">` placed
/// right after `node`.
pub(crate) fn wrap_following_siblings(
    tree: &mut ContentTree,
    node: NodeId,
    tag: &str,
    style: &str,
) -> NodeId {
    let wrapper = tree.create_element(tag, &[("style", style)]);
    let mut next = tree.next_sibling(node);
    while let Some(sibling) = next {
        next = tree.next_sibling(sibling);
        tree.append(wrapper, sibling);
    }
    tree.insert_after(node, wrapper);
    wrapper
}

/// WeChat renders the text after a `<strong>` that starts a list item on a
/// new line unless it is wrapped in an inline span.
pub fn process_strong_in_list_items(tree: &mut ContentTree) {
    let strongs = tree.elements_by_tag(tree.root(), "strong");
    let mut wrapped = 0usize;
    for strong in strongs {
        if tree.parent(strong).is_some_and(|p| tree.is_tag(p, "li")) {
            wrap_following_siblings(tree, strong, "span", "display: inline;");
            wrapped += 1;
        }
    }
    debug!(wrapped, "wrapped list item text after strong");
}

/// Replace task list checkboxes with ☑/☐ glyphs and keep the item text on
/// the same line.
pub fn process_task_lists(tree: &mut ContentTree) {
    let checkboxes = select(tree, tree.root(), r#"li input[type="checkbox"]"#);
    for &checkbox in &checkboxes {
        let glyph = if tree.has_attr(checkbox, "checked") { "☑" } else { "☐" };
        let span = tree.create_element(
            "span",
            &[("style", "margin-right: 0.5em; vertical-align: middle; font-size: 16px;")],
        );
        tree.set_text(span, glyph);
        tree.replace(checkbox, span);
        wrap_following_siblings(
            tree,
            span,
            "section",
            "display: inline; vertical-align: middle;",
        );
    }
    debug!(count = checkboxes.len(), "converted task list items");
}

/// Flatten nested `<ul>` into `<br>\n- item` lines inside their parent item,
/// the closest Medium gets to a nested list.
pub fn flatten_nested_lists(tree: &mut ContentTree) {
    let nested = select(tree, tree.root(), "ul ul");
    // Innermost first: reverse document order visits descendants before
    // their ancestors.
    for &ul in nested.iter().rev() {
        for (i, item) in tree.element_children(ul).into_iter().enumerate() {
            if i > 0 {
                let space = tree.create_text(" ");
                tree.insert_before(ul, space);
            }
            let br = tree.create_element("br", &[]);
            tree.insert_before(ul, br);
            let bullet = tree.create_text("\n- ");
            tree.insert_before(ul, bullet);

            if tree.is_tag(item, "li") {
                for child in tree.children(item).collect::<Vec<_>>() {
                    tree.insert_before(ul, child);
                }
            } else {
                tree.insert_before(ul, item);
            }
        }
        tree.detach(ul);
    }
    debug!(count = nested.len(), "flattened nested lists");
}
