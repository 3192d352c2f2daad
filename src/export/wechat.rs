//! WeChat official account export.
//!
//! The WeChat editor keeps only inline styles, so the whole theme is
//! flattened onto the elements and everything the theme expresses through
//! selectors the editor drops (pseudo-elements, list markers, link colour)
//! is rebuilt as real markup.

use tracing::debug;

use super::code::{process_code_blocks, process_inline_code};
use super::lists::{process_strong_in_list_items, process_task_lists};
use super::math::inline_math_svg;
use super::{ExportContext, Exporter};
use crate::css::{StyleSheet, merge_styles};
use crate::dom::{ContentTree, select};
use crate::error::Result;
use crate::footnote::FOOTNOTE_LINK_CLASS;
use crate::style::{apply_styles, inherited_value, materialize_pseudo_elements};

const PROVIDER: &str = "WenYan";

/// Elements that receive the font override.
const FONT_TARGETS: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, td, th, span:not(pre *)";

const CAPTION_STYLE: &[(&str, &str)] = &[
    ("display", "block"),
    ("text-align", "center"),
    ("font-size", "14px"),
    ("color", "#666666"),
    ("margin", "2px 0 8px 0"),
    ("line-height", "1.5"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WechatExporter;

impl Exporter for WechatExporter {
    fn export(&self, preview: &ContentTree, ctx: &ExportContext) -> Result<String> {
        let sheet = merge_styles(&ctx.theme_css, &ctx.highlight_css);
        let code_font = ctx.config.fonts.code.as_str();
        let mut tree = preview.clone();

        apply_styles(&sheet, &mut tree);
        inline_math_svg(&mut tree)?;
        process_inline_code(&mut tree, code_font, &ctx.config.code);
        process_strong_in_list_items(&mut tree);
        process_code_blocks(&mut tree, &ctx.highlight_css, code_font, &ctx.config.code);
        process_image_captions(&mut tree);
        materialize_pseudo_elements(&mut tree, &sheet);
        process_task_lists(&mut tree);
        if let Some(family) = ctx.config.fonts.family(ctx.font) {
            apply_font_override(&mut tree, family);
        }

        let link_color = footnote_link_color(preview, &sheet)
            .unwrap_or_else(|| ctx.config.footnotes.link_color.clone());
        style_footnote_links(&mut tree, &link_color);

        let root = tree.root();
        tree.set_attr(root, "data-provider", PROVIDER);

        Ok(tree
            .to_html()
            .replace(r#"class="mjx-solid""#, r#"fill="none" stroke-width="70""#))
    }
}

/// Force the caption style onto a `span` directly after an `img` whose
/// text is the image's alt text.
pub fn process_image_captions(tree: &mut ContentTree) {
    let mut captions = 0usize;
    for img in tree.elements_by_tag(tree.root(), "img") {
        let Some(span) = tree.next_element_sibling(img) else {
            continue;
        };
        let alt = tree.get_attr(img, "alt").unwrap_or_default();
        if !tree.is_tag(span, "span") || tree.text_content(span) != alt {
            continue;
        }
        tree.update_style(span, |style| {
            for (property, value) in CAPTION_STYLE {
                style.set_important(property, value);
            }
        });
        captions += 1;
    }
    debug!(captions, "styled image captions");
}

/// Set `font-family` with `!important` on text elements outside code
/// blocks and on the root.
pub fn apply_font_override(tree: &mut ContentTree, family: &str) {
    let targets = select(tree, tree.root(), FONT_TARGETS);
    for &id in &targets {
        tree.update_style(id, |style| style.set_important("font-family", family));
    }
    let root = tree.root();
    tree.update_style(root, |style| style.set_important("font-family", family));
    debug!(count = targets.len(), "applied font override");
}

/// The colour the preview shows for footnote links, if anything sets one.
fn footnote_link_color(preview: &ContentTree, sheet: &StyleSheet) -> Option<String> {
    let link = select(preview, preview.root(), "a.footnote-link")
        .into_iter()
        .next()?;
    inherited_value(preview, sheet, link, "color")
}

/// Replace the `footnote-link` class by inline styling: the link is wrapped
/// in an underlined bold span so the underline survives the editor.
pub fn style_footnote_links(tree: &mut ContentTree, color: &str) {
    let links = select(tree, tree.root(), "a.footnote-link");
    for &link in &links {
        tree.remove_class(link, FOOTNOTE_LINK_CLASS);

        let wrapper = tree.create_element("span", &[]);
        tree.update_style(wrapper, |style| {
            style.set("text-decoration", "underline");
            style.set("text-decoration-color", "inherit");
            style.set("font-weight", "bold");
            style.set("color", color);
        });
        tree.replace(link, wrapper);
        tree.append(wrapper, link);

        tree.update_style(link, |style| {
            style.set("text-decoration", "none");
            style.set("color", color);
        });
    }
    debug!(count = links.len(), %color, "styled footnote links");
}
