//! MathJax output handling.
//!
//! The preview renders formulas as `<mjx-container math="...">` holding an
//! `<svg>`. No target platform understands the custom element, so each
//! export swaps it in place for something the platform does accept.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::dom::{ContentTree, NodeId};
use crate::error::{Error, Result};

const MATH_CONTAINER: &str = "mjx-container";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Zhihu renders `data-eeimg` images from their `alt` source.
const ZHIHU_MATH_STYLE: &str = "margin: 0 auto; width: auto; max-width: 100%;";

const BLOCK_EQUATION_STYLE: &str = "text-align: center; margin-bottom: 1rem;";

fn containers(tree: &ContentTree) -> Vec<NodeId> {
    tree.elements_by_tag(tree.root(), MATH_CONTAINER)
}

fn container_svg(tree: &ContentTree, container: NodeId) -> Result<NodeId> {
    tree.find_element(container, |t, id| t.is_tag(id, "svg"))
        .ok_or_else(|| Error::MalformedMath(format!("<{MATH_CONTAINER}> without an <svg>")))
}

fn math_source(tree: &ContentTree, container: NodeId) -> String {
    tree.get_attr(container, "math").unwrap_or_default().to_string()
}

/// Replace each container by its bare SVG, moving `width`/`height` into
/// the inline style. A `.block-equation` parent is centered.
pub fn inline_math_svg(tree: &mut ContentTree) -> Result<()> {
    let found = containers(tree);
    for &container in &found {
        let svg = container_svg(tree, container)?;
        let width = tree.get_attr(svg, "width").map(str::to_string);
        let height = tree.get_attr(svg, "height").map(str::to_string);
        tree.update_style(svg, |style| {
            if let Some(width) = &width {
                style.set("width", width);
            }
            if let Some(height) = &height {
                style.set("height", height);
            }
        });
        tree.remove_attr(svg, "width");
        tree.remove_attr(svg, "height");

        let parent = tree.parent(container);
        tree.replace(container, svg);

        if let Some(parent) = parent
            && tree.has_class(parent, "block-equation")
        {
            tree.set_attr(parent, "style", BLOCK_EQUATION_STYLE);
        }
    }
    debug!(count = found.len(), "inlined math svg");
    Ok(())
}

/// Replace each container by an `<img>` whose `src` is the SVG as a
/// percent-encoded data URI.
pub fn math_to_data_uri(tree: &mut ContentTree) -> Result<()> {
    let found = containers(tree);
    for &container in &found {
        let svg = container_svg(tree, container)?;
        let encoded = utf8_percent_encode(&tree.outer_html(svg), URI_COMPONENT).to_string();
        let src = format!("data:image/svg+xml,{encoded}");
        let img = tree.create_element("img", &[("src", src.as_str())]);
        tree.replace(container, img);
    }
    debug!(count = found.len(), "converted math to data uris");
    Ok(())
}

/// Replace each container by a Zhihu formula image carrying the TeX
/// source in `alt`.
pub fn math_to_zhihu_images(tree: &mut ContentTree) {
    let found = containers(tree);
    for &container in &found {
        let source = math_source(tree, container);
        let img = tree.create_element(
            "img",
            &[
                ("alt", source.as_str()),
                ("data-eeimg", "true"),
                ("style", ZHIHU_MATH_STYLE),
            ],
        );
        tree.replace(container, img);
    }
    debug!(count = found.len(), "converted math to zhihu images");
}

/// Replace each container by its TeX source as plain text.
pub fn math_to_source_text(tree: &mut ContentTree) {
    let found = containers(tree);
    for &container in &found {
        let source = math_source(tree, container);
        let text = tree.create_text(source);
        tree.replace(container, text);
    }
    debug!(count = found.len(), "converted math to source text");
}
