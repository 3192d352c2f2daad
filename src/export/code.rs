//! Inline code and code block normalization for inline-style platforms.
//!
//! Editors on those platforms collapse whitespace and drop `white-space:
//! pre`, so indentation and space runs become non-breaking spaces and code
//! block line breaks become `<br>`.

use tracing::debug;

use super::lists::wrap_following_siblings;
use crate::config::CodeConfig;
use crate::dom::{ContentTree, NodeId, select};
use crate::patterns::HLJS_BACKGROUND_RE;

const NBSP: char = '\u{a0}';

/// Replace runs of two or more spaces with as many non-breaking spaces.
/// With `line_start`, a leading run of any length is replaced too.
fn protect_spaces(text: &str, line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut leading = line_start;

    while let Some(c) = chars.next() {
        if c != ' ' {
            leading = false;
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.next_if_eq(&' ').is_some() {
            run += 1;
        }
        let fill = if run >= 2 || leading { NBSP } else { ' ' };
        out.extend(std::iter::repeat_n(fill, run));
        leading = false;
    }
    out
}

/// Pick the code block background for a highlight stylesheet.
///
/// A sheet containing one of the configured dark signatures is dark; its
/// `.hljs { background: #... }` colour is used when present, else the
/// configured dark default.
pub fn code_background<'a>(highlight_css: &'a str, config: &'a CodeConfig) -> &'a str {
    let dark = config
        .dark_signatures
        .iter()
        .any(|signature| highlight_css.contains(signature.as_str()));
    if !dark {
        return &config.light_background;
    }
    HLJS_BACKGROUND_RE
        .captures(highlight_css)
        .and_then(|caps| caps.get(1))
        .map_or(config.dark_background.as_str(), |m| m.as_str())
}

/// Style inline `code` (outside `pre`) and protect its space runs.
pub fn process_inline_code(tree: &mut ContentTree, code_font: &str, config: &CodeConfig) {
    let codes = select(tree, tree.root(), "code:not(pre code)");
    for &code in &codes {
        tree.update_style(code, |style| {
            style.set("font-family", code_font);
            style.set("font-size", &config.font_size);
            style.set("line-height", &config.line_height);
        });

        for text in tree.text_nodes(code) {
            if let Some(content) = tree.text_mut(text) {
                *content = protect_spaces(content, false);
            }
        }

        if tree.parent(code).is_some_and(|p| tree.is_tag(p, "li")) {
            wrap_following_siblings(tree, code, "span", "display: inline;");
        }
    }
    debug!(count = codes.len(), "processed inline code");
}

/// Style `pre` blocks and their `code`, then rewrite the code text so each
/// line keeps its indentation and lines are joined with `<br>`.
pub fn process_code_blocks(
    tree: &mut ContentTree,
    highlight_css: &str,
    code_font: &str,
    config: &CodeConfig,
) {
    let background = code_background(highlight_css, config).to_string();
    let blocks = tree.elements_by_tag(tree.root(), "pre");

    for &pre in &blocks {
        tree.update_style(pre, |style| {
            style.set("font-family", code_font);
            style.set("font-size", &config.font_size);
            style.set("line-height", &config.line_height);
            style.set("padding", &config.padding);
            style.set("margin", &config.margin);
            style.set("border-radius", &config.border_radius);
            style.set("border", "none");
            style.set("box-shadow", "none");
            style.set("background-color", &background);
        });

        let Some(code) = tree.find_element(pre, |t, id| t.is_tag(id, "code")) else {
            continue;
        };
        tree.update_style(code, |style| {
            style.set("font-family", code_font);
            style.set("font-size", &config.font_size);
            style.set("line-height", &config.line_height);
            style.set("display", "block");
            style.set("background-color", "transparent");
            style.set("border", "none");
            style.set("padding", "0");
        });
        break_lines(tree, code);
    }
    debug!(count = blocks.len(), %background, "processed code blocks");
}

/// Split every text node under `code` at newlines, inserting `<br>`
/// elements, and protect leading indentation of each line.
fn break_lines(tree: &mut ContentTree, code: NodeId) {
    let mut line_start = true;

    for text in tree.text_nodes(code) {
        let Some(content) = tree.text(text).map(str::to_string) else {
            continue;
        };

        let mut replacement = Vec::new();
        for (i, segment) in content.split('\n').enumerate() {
            if i > 0 {
                replacement.push(tree.create_element("br", &[]));
                line_start = true;
            }
            if !segment.is_empty() {
                replacement.push(tree.create_text(protect_spaces(segment, line_start)));
                line_start = false;
            }
        }

        for node in replacement {
            tree.insert_before(text, node);
        }
        tree.detach(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = "monospace";

    #[test]
    fn test_protect_spaces() {
        assert_eq!(protect_spaces("a  b c", false), "a\u{a0}\u{a0}b c");
        assert_eq!(protect_spaces(" x", true), "\u{a0}x");
        assert_eq!(protect_spaces(" x", false), " x");
        assert_eq!(protect_spaces("    y", false), "\u{a0}\u{a0}\u{a0}\u{a0}y");
    }

    #[test]
    fn test_background_selection() {
        let config = CodeConfig::default();
        assert_eq!(code_background(".hljs{background:#fff}", &config), "#f8f9fa");
        assert_eq!(
            code_background(".hljs{color:#abb2bf;background:#282c34}", &config),
            "#282c34"
        );
        assert_eq!(code_background("pre{background:#1e1e1e}", &config), "#1e1e1e");

        let custom = CodeConfig {
            dark_signatures: vec!["background: #000".to_string()],
            ..CodeConfig::default()
        };
        assert_eq!(code_background(".x{background: #000}", &custom), "#1e1e1e");
    }

    #[test]
    fn test_inline_code_in_list_item() {
        let mut tree = ContentTree::parse("<ul><li><code>a  b</code> rest <em>x</em></li></ul>");
        process_inline_code(&mut tree, FONT, &CodeConfig::default());
        let li = tree.elements_by_tag(tree.root(), "li")[0];
        assert_eq!(
            tree.inner_html(li),
            r#"<code style="font-family: monospace; font-size: 14px; line-height: 1.5;">a&nbsp;&nbsp;b</code><span style="display: inline;"> rest <em>x</em></span>"#
        );
    }

    #[test]
    fn test_code_block_lines() {
        let mut tree = ContentTree::parse(
            "<pre><code class=\"hljs\">fn main() {\n    <span class=\"k\">let</span> x  = 1;\n}\n</code></pre>",
        );
        process_code_blocks(&mut tree, "", FONT, &CodeConfig::default());

        let code = tree.elements_by_tag(tree.root(), "code")[0];
        assert_eq!(
            tree.inner_html(code),
            "fn main() {<br>&nbsp;&nbsp;&nbsp;&nbsp;<span class=\"k\">let</span> x&nbsp;&nbsp;= 1;<br>}<br>"
        );
        let pre = tree.elements_by_tag(tree.root(), "pre")[0];
        let style = tree.style(pre);
        assert_eq!(style.get("background-color"), Some("#f8f9fa"));
        assert_eq!(style.get("padding"), Some("16px 20px"));
        assert_eq!(tree.style(code).get("display"), Some("block"));
    }

    #[test]
    fn test_single_space_after_span_is_kept() {
        let mut tree = ContentTree::parse("<pre><code><span>a</span> b</code></pre>");
        process_code_blocks(&mut tree, "", FONT, &CodeConfig::default());
        let code = tree.elements_by_tag(tree.root(), "code")[0];
        assert_eq!(tree.inner_html(code), "<span>a</span> b");
    }
}
