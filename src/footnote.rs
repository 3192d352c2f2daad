//! Link footnotes.
//!
//! Platforms like WeChat strip outbound links, so every `a[href]` gets a
//! numbered `<sup class="footnote">` marker and the URLs are listed in a
//! section appended to the document. The annotation is reversible:
//! [`remove_footnotes`] restores a tree structurally equal to the original.

use serde::Deserialize;
use tracing::debug;

use crate::dom::{ContentTree, escape_text, select};

/// Heading of the appended footnote section.
pub const FOOTNOTE_TITLE: &str = "引用链接";

/// Class added to every annotated link.
pub const FOOTNOTE_LINK_CLASS: &str = "footnote-link";

/// How the footnote section is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootnoteLayout {
    /// `section#footnotes` with one `<p>` per link.
    #[default]
    Paragraph,
    /// `div#footnotes` holding a `<ul>`.
    List,
}

impl std::str::FromStr for FootnoteLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paragraph" => Ok(FootnoteLayout::Paragraph),
            "list" => Ok(FootnoteLayout::List),
            other => Err(format!("unknown footnote layout `{other}`")),
        }
    }
}

/// One collected link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    /// 1-based position in document order
    pub index: usize,
    pub text: String,
    pub href: String,
}

impl Footnote {
    fn to_html(&self, layout: FootnoteLayout) -> String {
        let n = self.index;
        let text = escape_text(&self.text);
        let href = escape_text(&self.href);
        let bare = self.text == self.href;
        match (layout, bare) {
            (FootnoteLayout::Paragraph, true) => format!(
                r#"<p><span class="footnote-num">[{n}]</span><span class="footnote-txt"><i>{text}</i></span></p>"#
            ),
            (FootnoteLayout::Paragraph, false) => format!(
                r#"<p><span class="footnote-num">[{n}]</span><span class="footnote-txt">{text}: <i>{href}</i></span></p>"#
            ),
            (FootnoteLayout::List, true) => {
                format!(r##"<li id="#footnote-{n}">[{n}]: <i>{text}</i></li>"##)
            }
            (FootnoteLayout::List, false) => {
                format!(r##"<li id="#footnote-{n}">[{n}] {text}: <i>{href}</i></li>"##)
            }
        }
    }
}

/// Whether the tree already carries footnote markers.
pub fn has_footnotes(tree: &ContentTree) -> bool {
    !select(tree, tree.root(), "sup.footnote").is_empty()
}

/// The layout of the footnote section currently in the tree, if any.
pub fn current_layout(tree: &ContentTree) -> Option<FootnoteLayout> {
    let section = tree.find_element(tree.root(), |t, id| t.get_attr(id, "id") == Some("footnotes"))?;
    if tree.is_tag(section, "div") {
        Some(FootnoteLayout::List)
    } else {
        Some(FootnoteLayout::Paragraph)
    }
}

/// Annotate every link with a numbered marker and append the footnote
/// section. Does nothing if markers already exist.
pub fn add_footnotes(tree: &mut ContentTree, layout: FootnoteLayout) -> Vec<Footnote> {
    add_footnotes_titled(tree, layout, FOOTNOTE_TITLE)
}

/// [`add_footnotes`] with a custom section heading.
pub fn add_footnotes_titled(
    tree: &mut ContentTree,
    layout: FootnoteLayout,
    title: &str,
) -> Vec<Footnote> {
    if has_footnotes(tree) {
        debug!("footnotes already present");
        return Vec::new();
    }

    let links = select(tree, tree.root(), "a[href]");
    let mut footnotes = Vec::with_capacity(links.len());

    for link in links {
        let index = footnotes.len() + 1;
        footnotes.push(Footnote {
            index,
            text: tree.text_content(link),
            href: tree.get_attr(link, "href").unwrap_or_default().to_string(),
        });

        tree.add_class(link, FOOTNOTE_LINK_CLASS);
        let marker = tree.create_element("sup", &[("class", "footnote")]);
        tree.set_text(marker, format!("[{index}]"));
        tree.insert_after(link, marker);
    }

    if !footnotes.is_empty() {
        let items: String = footnotes.iter().map(|f| f.to_html(layout)).collect();
        let section = match layout {
            FootnoteLayout::Paragraph => format!(r#"<section id="footnotes">{items}</section>"#),
            FootnoteLayout::List => format!(r#"<div id="footnotes"><ul>{items}</ul></div>"#),
        };
        let markup = format!("<h3>{}</h3>{section}", escape_text(title));
        let root = tree.root();
        tree.append_html(root, &markup);
    }

    debug!(count = footnotes.len(), ?layout, "added footnotes");
    footnotes
}

/// Undo [`add_footnotes`].
pub fn remove_footnotes(tree: &mut ContentTree) {
    remove_footnotes_titled(tree, FOOTNOTE_TITLE);
}

/// [`remove_footnotes`] for a section added with a custom heading.
pub fn remove_footnotes_titled(tree: &mut ContentTree, title: &str) {
    let root = tree.root();

    if let Some(section) = tree.find_element(root, |t, id| t.get_attr(id, "id") == Some("footnotes"))
    {
        tree.detach(section);
    }

    for heading in tree.elements_by_tag(root, "h3") {
        if tree.text_content(heading) == title {
            tree.detach(heading);
        }
    }

    for link in select(tree, root, "a.footnote-link") {
        tree.remove_class(link, FOOTNOTE_LINK_CLASS);
    }

    let markers = select(tree, root, "sup.footnote");
    let removed = markers.len();
    for marker in markers {
        tree.detach(marker);
    }

    debug!(removed, "removed footnotes");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<p>See <a href="https://a.example">docs</a> and <a href="https://b.example">https://b.example</a>.</p><p><a name="anchor">no href</a></p>"#;

    #[test]
    fn test_paragraph_layout_markup() {
        let mut tree = ContentTree::parse(DOC);
        let notes = add_footnotes(&mut tree, FootnoteLayout::Paragraph);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].index, 2);

        let html = tree.to_html();
        assert!(html.contains(
            r#"<a href="https://a.example" class="footnote-link">docs</a><sup class="footnote">[1]</sup>"#
        ));
        assert!(html.contains(
            r#"<h3>引用链接</h3><section id="footnotes"><p><span class="footnote-num">[1]</span><span class="footnote-txt">docs: <i>https://a.example</i></span></p><p><span class="footnote-num">[2]</span><span class="footnote-txt"><i>https://b.example</i></span></p></section>"#
        ));
    }

    #[test]
    fn test_list_layout_markup() {
        let mut tree = ContentTree::parse(DOC);
        add_footnotes(&mut tree, FootnoteLayout::List);
        let html = tree.to_html();
        assert!(html.contains(
            r##"<div id="footnotes"><ul><li id="#footnote-1">[1] docs: <i>https://a.example</i></li><li id="#footnote-2">[2]: <i>https://b.example</i></li></ul></div>"##
        ));
        assert_eq!(current_layout(&tree), Some(FootnoteLayout::List));
    }

    #[test]
    fn test_idempotent() {
        let mut tree = ContentTree::parse(DOC);
        add_footnotes(&mut tree, FootnoteLayout::Paragraph);
        let again = add_footnotes(&mut tree, FootnoteLayout::List);
        assert!(again.is_empty());
        assert_eq!(select(&tree, tree.root(), "sup.footnote").len(), 2);
        assert_eq!(current_layout(&tree), Some(FootnoteLayout::Paragraph));
    }

    #[test]
    fn test_remove_restores_original() {
        let original = ContentTree::parse(r#"<p><a class="x" href="u">t</a> tail</p>"#);
        for layout in [FootnoteLayout::Paragraph, FootnoteLayout::List] {
            let mut tree = original.clone();
            add_footnotes(&mut tree, layout);
            assert!(!tree.structurally_eq(&original));
            remove_footnotes(&mut tree);
            assert!(tree.structurally_eq(&original), "{layout:?}");
        }
    }

    #[test]
    fn test_no_links_appends_nothing() {
        let original = ContentTree::parse("<p>plain</p>");
        let mut tree = original.clone();
        assert!(add_footnotes(&mut tree, FootnoteLayout::Paragraph).is_empty());
        assert!(tree.structurally_eq(&original));
        assert_eq!(current_layout(&tree), None);
    }

    #[test]
    fn test_custom_title() {
        let mut tree = ContentTree::parse(DOC);
        add_footnotes_titled(&mut tree, FootnoteLayout::Paragraph, "References");
        assert!(tree.to_html().contains("<h3>References</h3>"));
        remove_footnotes_titled(&mut tree, "References");
        assert!(!tree.to_html().contains("References"));
    }

    #[test]
    fn test_link_text_is_escaped() {
        let mut tree = ContentTree::parse(r#"<a href="u?a=1&amp;b=2">&lt;x&gt;</a>"#);
        add_footnotes(&mut tree, FootnoteLayout::Paragraph);
        let html = tree.to_html();
        assert!(html.contains("&lt;x&gt;: <i>u?a=1&amp;b=2</i>"));
    }
}
