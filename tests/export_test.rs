//! End-to-end export tests against the fixture post and theme.

use wenyan::dom::select;
use wenyan::{ContentTree, FontChoice, FootnoteLayout, Platform, Session};

const THEME: &str = include_str!("fixtures/theme.css");
const HIGHLIGHT: &str = include_str!("fixtures/highlight.css");
const POST: &str = include_str!("fixtures/post.md");

fn session() -> Session {
    let mut session = Session::default();
    session.set_theme(THEME);
    session.set_highlight(HIGHLIGHT);
    session.set_content(POST);
    session
}

fn reparse(html: &str) -> ContentTree {
    ContentTree::parse(html)
}

// ============================================================================
// WeChat
// ============================================================================

#[test]
fn test_wechat_inlines_theme() {
    let html = session().export(Platform::Wechat).unwrap();
    let tree = reparse(&html);
    let root = tree.root();

    assert_eq!(tree.get_attr(root, "data-provider"), Some("WenYan"));
    let root_style = tree.style(root);
    assert_eq!(root_style.get("color"), Some("#3e3e3e"));
    assert_eq!(root_style.get("line-height"), Some("1.75"));

    let h2 = tree.elements_by_tag(root, "h2")[0];
    assert_eq!(
        tree.style(h2).get("border-bottom"),
        Some("2px solid #ef7060")
    );
    assert!(!html.contains("var(--"));
}

#[test]
fn test_wechat_materializes_heading_pseudos() {
    let html = session().export(Platform::Wechat).unwrap();
    let tree = reparse(&html);
    let h2 = tree.elements_by_tag(tree.root(), "h2")[0];
    let children = tree.element_children(h2);

    // ::before, the heading span, ::after
    assert_eq!(children.len(), 3);
    let before = tree.style(children[0]);
    assert_eq!(before.get("display"), Some("inline-block"));
    assert_eq!(before.get("vertical-align"), Some("bottom"));
    assert_eq!(tree.text_content(children[2]), " ❀");
    assert_eq!(tree.style(children[2]).get("color"), Some("#ef7060"));
}

#[test]
fn test_wechat_code_blocks_use_dark_highlight_background() {
    let html = session().export(Platform::Wechat).unwrap();
    let tree = reparse(&html);
    let pre = tree.elements_by_tag(tree.root(), "pre")[0];
    assert_eq!(tree.style(pre).get("background-color"), Some("#282c34"));

    let code = tree.elements_by_tag(pre, "code")[0];
    assert_eq!(tree.elements_by_tag(code, "br").len(), 3);
    assert!(tree.text_content(code).contains("\u{a0}\u{a0}\u{a0}\u{a0}println!"));
}

#[test]
fn test_wechat_list_items() {
    let html = session().export(Platform::Wechat).unwrap();
    let tree = reparse(&html);

    assert!(html.contains("☑"));
    assert!(html.contains("☐"));
    assert!(tree.elements_by_tag(tree.root(), "input").is_empty());

    let strong = tree.elements_by_tag(tree.root(), "strong")[0];
    let wrapper = tree.next_element_sibling(strong).unwrap();
    assert_eq!(tree.get_attr(wrapper, "style"), Some("display: inline;"));

    let inline_code = select(&tree, tree.root(), "code:not(pre code)");
    assert!(tree.text_content(inline_code[0]).contains("unsafe\u{a0}\u{a0}code"));
}

#[test]
fn test_wechat_footnotes_use_theme_link_color() {
    let mut session = session();
    session.enable_footnotes(FootnoteLayout::Paragraph);
    let html = session.export(Platform::Wechat).unwrap();

    assert!(!html.contains("footnote-link"));
    assert!(html.contains(
        "text-decoration: underline; text-decoration-color: inherit; font-weight: bold; color: #ef7060;"
    ));
    assert!(html.contains(r#"<h3"#));
    assert!(html.contains("引用链接"));
}

#[test]
fn test_wechat_font_override() {
    let mut session = session();
    session.set_font(FontChoice::Serif);
    let html = session.export(Platform::Wechat).unwrap();
    let tree = reparse(&html);
    let p = tree.elements_by_tag(tree.root(), "p")[0];
    let style = tree.get_attr(p, "style").unwrap();
    assert!(style.contains("font-family: \"Noto Serif CJK SC\""));
    assert!(style.ends_with("serif !important;"));
}

// ============================================================================
// Other platforms
// ============================================================================

#[test]
fn test_medium_output() {
    let html = session().export(Platform::Medium).unwrap();
    assert!(html.contains(r#"<pre data-code-block-lang="rust" data-code-block-mode="2">"#));
    assert!(html.contains("| Name | Score |"));
    assert!(!html.contains("<table"));
    assert!(html.contains("<span>Quoted wisdom.\n\n</span>"));
    assert!(!html.contains("<blockquote>\n<p>"));
}

#[test]
fn test_juejin_is_preprocessed_markdown() {
    let md = session().export(Platform::Juejin).unwrap();
    assert!(md.starts_with("# Weekly Notes\n\n> Things worth reading this week\n\n"));
    assert!(md.contains("## Reading"));
}

#[test]
fn test_exports_leave_preview_untouched() {
    let session = session();
    let before = session.preview().clone();
    for platform in Platform::ALL {
        session.export(platform).unwrap();
    }
    assert!(session.preview().structurally_eq(&before));
}

#[test]
fn test_html_exports_reparse_cleanly() {
    let mut session = session();
    session.set_preview_html(
        r#"<section id="wenyan" class="preview"><p>Mass <mjx-container math="E=mc^2"><svg width="5ex" height="2ex"><g class="mjx-solid"></g></svg></mjx-container></p></section>"#,
    );
    for platform in [Platform::Wechat, Platform::Zhihu, Platform::Medium, Platform::Generic] {
        let html = session.export(platform).unwrap();
        assert!(!html.contains("mjx-container"), "{platform}");
        let tree = reparse(&html);
        assert_eq!(tree.to_html(), html, "{platform}");
    }

    let wechat = session.export(Platform::Wechat).unwrap();
    assert!(wechat.contains(r#"<g fill="none" stroke-width="70"></g>"#));
}

#[test]
fn test_malformed_math_aborts_export() {
    let mut session = session();
    session.set_preview_html(r#"<p><mjx-container math="x"></mjx-container></p>"#);
    assert!(matches!(
        session.export(Platform::Wechat),
        Err(wenyan::Error::MalformedMath(_))
    ));
    assert!(session.export(Platform::Zhihu).is_ok());
}
