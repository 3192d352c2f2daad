//! `::before` / `::after` materialization.
//!
//! Inline-style-only platforms drop pseudo-elements, so the decorations a
//! theme draws on headings and blockquotes are turned into real `<span>`
//! children carrying the same declarations.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::css::{DeclarationBlock, StyleSheet};
use crate::dom::{ContentTree, NodeId, select};
use crate::patterns::{REMOTE_URL_RE, SVG_BASE64_RE, SVG_UTF8_RE};

/// Elements whose pseudo-elements are materialized.
const PSEUDO_HOSTS: &str = "h1, h2, h3, h4, h5, h6, blockquote";

/// Which side of the host a pseudo-element renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoKind {
    Before,
    After,
}

impl PseudoKind {
    fn selector_suffix(self) -> &'static str {
        match self {
            PseudoKind::Before => "::before",
            PseudoKind::After => "::after",
        }
    }
}

/// How a `url(...)` value inside a pseudo-element is embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoUrl {
    /// `data:image/svg+xml;utf8,...`, holds the decoded SVG markup
    InlineSvgUtf8(String),
    /// `data:image/svg+xml;base64,...`, holds the decoded SVG markup
    InlineSvgBase64(String),
    /// An `http(s)` image URL
    RemoteImage(String),
    Unsupported,
}

impl PseudoUrl {
    /// Classify a declaration value that contains `url(`.
    pub fn classify(value: &str) -> Self {
        if let Some(caps) = SVG_UTF8_RE.captures(value) {
            return match percent_decode_str(&caps[1]).decode_utf8() {
                Ok(markup) => PseudoUrl::InlineSvgUtf8(markup.into_owned()),
                Err(err) => {
                    warn!(%err, "svg data uri is not valid utf-8");
                    PseudoUrl::Unsupported
                }
            };
        }

        if let Some(caps) = SVG_BASE64_RE.captures(value) {
            let decoded = STANDARD
                .decode(caps[1].trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            return match decoded {
                Some(markup) => PseudoUrl::InlineSvgBase64(markup),
                None => {
                    warn!("could not decode base64 svg data uri");
                    PseudoUrl::Unsupported
                }
            };
        }

        if let Some(caps) = REMOTE_URL_RE.captures(value) {
            return PseudoUrl::RemoteImage(caps[1].to_string());
        }

        PseudoUrl::Unsupported
    }
}

/// Collect the declarations of every rule whose selector text mentions
/// `<tag>::after` (checked first) or `<tag>::before`.
fn collect_pseudo_declarations(
    sheet: &StyleSheet,
    tag: &str,
) -> (DeclarationBlock, DeclarationBlock) {
    let before_marker = format!("{tag}{}", PseudoKind::Before.selector_suffix());
    let after_marker = format!("{tag}{}", PseudoKind::After.selector_suffix());
    let mut before = DeclarationBlock::new();
    let mut after = DeclarationBlock::new();

    for rule in sheet.iter() {
        let text = rule.selector_text();
        if text.contains(&after_marker) {
            after.extend(&rule.declarations);
        } else if text.contains(&before_marker) {
            before.extend(&rule.declarations);
        }
    }

    (before, after)
}

/// Turn `::before` / `::after` rules on `h1`-`h6` and `blockquote` into
/// real spans. `::before` spans become the first child, `::after` spans
/// the last.
pub fn materialize_pseudo_elements(tree: &mut ContentTree, sheet: &StyleSheet) {
    let hosts = select(tree, tree.root(), PSEUDO_HOSTS);
    let mut created = 0usize;

    for host in hosts {
        let Some(tag) = tree.element_name(host).map(|n| n.to_string()) else {
            continue;
        };
        let (before, after) = collect_pseudo_declarations(sheet, &tag);

        if !after.is_empty() {
            let span = build_pseudo_span(tree, after);
            tree.append(host, span);
            created += 1;
        }
        if !before.is_empty() {
            let span = build_pseudo_span(tree, before);
            tree.prepend(host, span);
            created += 1;
        }
    }

    debug!(created, "materialized pseudo-elements");
}

/// Build a detached `<span>` for one pseudo-element.
pub fn build_pseudo_span(tree: &mut ContentTree, mut declarations: DeclarationBlock) -> NodeId {
    let span = tree.create_element("span", &[]);

    if let Some(content) = declarations.remove("content") {
        let text = content.value.replace(['"', '\''], "");
        tree.set_text(span, text);
    }

    let url_properties: Vec<_> = declarations
        .iter()
        .filter(|d| d.value.contains("url("))
        .map(|d| (d.property.clone(), d.value.clone()))
        .collect();

    for (property, value) in url_properties {
        match PseudoUrl::classify(&value) {
            PseudoUrl::InlineSvgUtf8(markup) | PseudoUrl::InlineSvgBase64(markup) => {
                tree.clear_children(span);
                tree.append_html(span, &markup);
            }
            PseudoUrl::RemoteImage(src) => {
                let img = tree.create_element(
                    "img",
                    &[("src", src.as_str()), ("style", "vertical-align: top;")],
                );
                tree.append(span, img);
            }
            PseudoUrl::Unsupported => {
                warn!(property = %property, "unsupported url in pseudo-element, dropping");
            }
        }
        declarations.remove(&property);
    }

    let has_border_bottom = declarations
        .iter()
        .any(|d| d.property.starts_with("border-bottom"));

    tree.update_style(span, |style| {
        for decl in declarations.iter().filter(|d| !d.property.starts_with("--")) {
            style.set(&decl.property, &decl.value);
        }
        style.set_default("display", "inline-block");
        if has_border_bottom {
            style.set_default("vertical-align", "bottom");
        }
    });

    span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(tree: &ContentTree) -> NodeId {
        tree.elements_by_tag(tree.root(), "h2")[0]
    }

    #[test]
    fn test_before_and_after_positions() {
        let mut tree = ContentTree::parse("<h2><span>Title</span></h2>");
        let sheet = StyleSheet::parse(
            "#wenyan h2::before { content: \"[\"; } #wenyan h2::after { content: ']'; }",
        );
        materialize_pseudo_elements(&mut tree, &sheet);

        let h2 = heading(&tree);
        assert_eq!(tree.text_content(h2), "[Title]");
        let children = tree.element_children(h2);
        assert_eq!(children.len(), 3);
        assert_eq!(
            tree.get_attr(children[0], "style"),
            Some("display: inline-block;")
        );
    }

    #[test]
    fn test_explicit_display_is_kept() {
        let mut tree = ContentTree::parse("<h2>T</h2>");
        let sheet = StyleSheet::parse("h2::after { content: ''; display: block; height: 2px; }");
        materialize_pseudo_elements(&mut tree, &sheet);
        let span = tree.element_children(heading(&tree))[0];
        assert_eq!(tree.get_attr(span, "style"), Some("display: block; height: 2px;"));
    }

    #[test]
    fn test_border_triangle_gets_bottom_alignment() {
        let mut tree = ContentTree::parse("<h2>T</h2>");
        let sheet = StyleSheet::parse(
            "h2::before { content: ''; border-bottom: 10px solid red; width: 0; }",
        );
        materialize_pseudo_elements(&mut tree, &sheet);
        let span = tree.element_children(heading(&tree))[0];
        let style = tree.style(span);
        assert_eq!(style.get("vertical-align"), Some("bottom"));
        assert_eq!(style.get("display"), Some("inline-block"));
    }

    #[test]
    fn test_later_rules_win() {
        let mut tree = ContentTree::parse("<blockquote><p>q</p></blockquote>");
        let sheet = StyleSheet::parse(
            "blockquote::before { content: 'a'; color: red } blockquote::before { content: 'b' }",
        );
        materialize_pseudo_elements(&mut tree, &sheet);
        let bq = tree.elements_by_tag(tree.root(), "blockquote")[0];
        let span = tree.element_children(bq)[0];
        assert_eq!(tree.text_content(span), "b");
        assert_eq!(tree.style(span).get("color"), Some("red"));
    }

    #[test]
    fn test_utf8_svg_is_injected() {
        let mut tree = ContentTree::parse("<h1>T</h1>");
        let sheet = StyleSheet::parse(
            "h1::before { content: ''; background-image: url(\"data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg'><circle r='1'/></svg>\"); }",
        );
        materialize_pseudo_elements(&mut tree, &sheet);
        let h1 = tree.elements_by_tag(tree.root(), "h1")[0];
        let span = tree.element_children(h1)[0];
        assert_eq!(tree.elements_by_tag(span, "svg").len(), 1);
        assert!(!tree.style(span).contains("background-image"));
    }

    #[test]
    fn test_base64_svg_is_injected() {
        let svg = "<svg><rect width='1'/></svg>";
        let encoded = STANDARD.encode(svg);
        let css = format!(
            "h3::after {{ content: ''; background: url(data:image/svg+xml;base64,{encoded}); }}"
        );
        let mut tree = ContentTree::parse("<h3>T</h3>");
        materialize_pseudo_elements(&mut tree, &StyleSheet::parse(&css));
        let h3 = tree.elements_by_tag(tree.root(), "h3")[0];
        assert_eq!(tree.elements_by_tag(h3, "rect").len(), 1);
    }

    #[test]
    fn test_remote_url_becomes_img() {
        let value = "url('https://example.com/a.png') no-repeat";
        assert_eq!(
            PseudoUrl::classify(value),
            PseudoUrl::RemoteImage("https://example.com/a.png".to_string())
        );

        let mut tree = ContentTree::parse("<h4>T</h4>");
        let sheet = StyleSheet::parse(&format!("h4::before {{ background: {value}; }}"));
        materialize_pseudo_elements(&mut tree, &sheet);
        let img = tree.elements_by_tag(tree.root(), "img")[0];
        assert_eq!(tree.get_attr(img, "src"), Some("https://example.com/a.png"));
        assert_eq!(tree.get_attr(img, "style"), Some("vertical-align: top;"));
    }

    #[test]
    fn test_unsupported_url_is_dropped() {
        assert_eq!(PseudoUrl::classify("url(local.png)"), PseudoUrl::Unsupported);
        let mut decls = DeclarationBlock::parse_inline("background: url(local.png); color: red");
        decls.set("content", "'x'");
        let mut tree = ContentTree::new();
        let span = build_pseudo_span(&mut tree, decls);
        assert_eq!(
            tree.get_attr(span, "style"),
            Some("color: red; display: inline-block;")
        );
    }

    #[test]
    fn test_other_tags_are_untouched() {
        let mut tree = ContentTree::parse("<p>x</p><h2>y</h2>");
        let sheet = StyleSheet::parse("p::before { content: '>'; }");
        materialize_pseudo_elements(&mut tree, &sheet);
        assert_eq!(tree.text_content(tree.root()), "xy");
    }
}
