//! Markdown to preview HTML.
//!
//! The output mirrors what the preview expects from its renderer:
//! - headings wrap their content in a `<span>` so themes can decorate it
//! - paragraphs holding display math (`$$...$$`, `\[...\]`) are emitted as
//!   bare text for the math typesetter
//! - images may be followed by a caption span built from the alt text
//! - fenced code carries `hljs language-*` classes
//! - everything sits inside `<section id="wenyan" class="preview">`

mod front_matter;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use tracing::debug;

use crate::dom::{ContentTree, escape_attr, escape_text};
use crate::patterns::DISPLAY_MATH_RE;

pub use front_matter::{FrontMatter, preprocess, split_front_matter};

/// Inline style of an image caption span.
pub const CAPTION_STYLE: &str = "display: block; text-align: center; font-size: 14px; color: #666666; margin: 2px 0 8px 0; line-height: 1.5; font-style: normal; font-weight: normal;";

/// Language class used for code blocks without an info string.
/// Language class used for code blocks without an info string, or whose
/// language the highlighter does not know.
const PLAIN_LANGUAGE: &str = "plaintext";

/// Language names and aliases of the highlighter's common bundle.
const KNOWN_LANGUAGES: &[&str] = &[
    "apache", "arduino", "bash", "c", "c++", "cc", "clj", "clojure", "cmake", "coffee",
    "coffeescript", "console", "cpp", "cs", "csharp", "css", "dart", "diff", "docker",
    "dockerfile", "elixir", "erl", "erlang", "ex", "go", "golang", "gql", "graphql", "gradle",
    "groovy", "h", "haskell", "hpp", "hs", "html", "http", "ini", "java", "javascript", "js",
    "json", "jsx", "kotlin", "kt", "less", "lua", "makefile", "markdown", "md", "mk", "nginx",
    "objc", "objectivec", "perl", "php", "pl", "plaintext", "powershell", "ps1", "py",
    "python", "r", "rb", "rs", "ruby", "rust", "scala", "scss", "sh", "shell", "sql", "svg",
    "swift", "text", "toml", "ts", "tsx", "txt", "typescript", "vb", "vbnet", "vim", "xml",
    "yaml", "yml", "zsh",
];

/// The class-name language for a fenced block's info string.
fn code_language(info: &str) -> String {
    match info.split_whitespace().next() {
        Some(lang) if KNOWN_LANGUAGES.contains(&lang.to_ascii_lowercase().as_str()) => {
            lang.to_string()
        }
        _ => PLAIN_LANGUAGE.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Follow images that have alt text with a caption span
    pub captions: bool,
}

fn pulldown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Index of the first event at or after `from` matching `end`.
fn find_end(events: &[(Event<'_>, std::ops::Range<usize>)], from: usize, end: TagEnd) -> usize {
    events[from..]
        .iter()
        .position(|(event, _)| matches!(event, Event::End(e) if *e == end))
        .map_or(events.len(), |offset| from + offset)
}

/// Concatenated text and inline code of `events`.
fn plain_text(events: &[(Event<'_>, std::ops::Range<usize>)]) -> String {
    events
        .iter()
        .filter_map(|(event, _)| match event {
            Event::Text(text) | Event::Code(text) => Some(text.as_ref()),
            Event::SoftBreak | Event::HardBreak => Some(" "),
            _ => None,
        })
        .collect()
}

/// Render Markdown (front matter already expanded) to preview HTML.
pub fn render_markdown(markdown: &str, options: &RenderOptions) -> String {
    let events: Vec<_> = Parser::new_ext(markdown, pulldown_options())
        .into_offset_iter()
        .collect();
    let mut out: Vec<Event<'_>> = Vec::with_capacity(events.len());

    let mut i = 0;
    while i < events.len() {
        let (event, range) = &events[i];
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                out.push(Event::Html(CowStr::from(format!("<{level}><span>"))));
                i += 1;
            }
            Event::End(TagEnd::Heading(level)) => {
                out.push(Event::Html(CowStr::from(format!("</span></{level}>\n"))));
                i += 1;
            }
            Event::Start(Tag::Paragraph) => {
                let source = markdown[range.clone()].trim_end();
                if source.len() > 4 && DISPLAY_MATH_RE.is_match(source) {
                    out.push(Event::Text(CowStr::from(format!("{source}\n"))));
                    i = find_end(&events, i, TagEnd::Paragraph) + 1;
                } else {
                    out.push(event.clone());
                    i += 1;
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let end = find_end(&events, i, TagEnd::Image);
                let alt = plain_text(&events[i + 1..end]);
                let mut html = format!(
                    r#"<img src="{}" alt="{}""#,
                    escape_attr(dest_url),
                    escape_attr(&alt)
                );
                if !title.is_empty() {
                    html.push_str(&format!(r#" title="{}""#, escape_attr(title)));
                }
                html.push('>');
                if options.captions && !alt.trim().is_empty() {
                    html.push_str(&format!(
                        r#"<span style="{CAPTION_STYLE}">{}</span>"#,
                        escape_text(&alt)
                    ));
                }
                out.push(Event::Html(CowStr::from(html)));
                i = end + 1;
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => code_language(&info),
                    CodeBlockKind::Indented => PLAIN_LANGUAGE.to_string(),
                };
                let end = find_end(&events, i, TagEnd::CodeBlock);
                let code: String = events[i + 1..end]
                    .iter()
                    .filter_map(|(event, _)| match event {
                        Event::Text(text) => Some(text.as_ref()),
                        _ => None,
                    })
                    .collect();
                out.push(Event::Html(CowStr::from(format!(
                    "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
                    escape_attr(&lang),
                    escape_text(&code)
                ))));
                i = end + 1;
            }
            _ => {
                out.push(event.clone());
                i += 1;
            }
        }
    }

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut body, out.into_iter());
    debug!(events = events.len(), bytes = body.len(), "rendered markdown");

    format!(r#"<section id="wenyan" class="preview">{body}</section>"#)
}

/// Preprocess, render and parse Markdown into a preview tree.
pub fn render_preview(markdown: &str, options: &RenderOptions) -> ContentTree {
    ContentTree::parse(&render_markdown(&preprocess(markdown), options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        render_markdown(md, &RenderOptions::default())
    }

    #[test]
    fn test_wrapped_in_section() {
        let html = render("hello");
        assert_eq!(
            html,
            "<section id=\"wenyan\" class=\"preview\"><p>hello</p>\n</section>"
        );
    }

    #[test]
    fn test_heading_span() {
        assert!(render("## Sub *title*").contains("<h2><span>Sub <em>title</em></span></h2>"));
    }

    #[test]
    fn test_display_math_paragraph_is_bare() {
        let html = render("$$\nx^2 < y\n$$\n\ntext");
        assert!(html.contains("$$\nx^2 &lt; y\n$$\n<p>text</p>"));
        let bracket = render(r"\[ a + b \]");
        assert!(bracket.contains(r"\[ a + b \]"));
        assert!(!bracket.contains("<p>"));
    }

    #[test]
    fn test_short_math_stays_paragraph() {
        assert!(render("$$$$").contains("<p>"));
    }

    #[test]
    fn test_image_caption() {
        let md = "![A cat](cat.png \"Kitty\")";
        let plain = render(md);
        assert!(plain.contains(r#"<img src="cat.png" alt="A cat" title="Kitty">"#));
        assert!(!plain.contains("<span"));

        let captioned = render_markdown(md, &RenderOptions { captions: true });
        assert!(captioned.contains(&format!(
            r#"<img src="cat.png" alt="A cat" title="Kitty"><span style="{CAPTION_STYLE}">A cat</span>"#
        )));
    }

    #[test]
    fn test_code_block_classes() {
        let html = render("```rust ignore\nlet x = 1 < 2;\n```\n\n    indented\n");
        assert!(html.contains(
            "<pre><code class=\"hljs language-rust\">let x = 1 &lt; 2;\n</code></pre>"
        ));
        assert!(html.contains("<pre><code class=\"hljs language-plaintext\">indented\n</code></pre>"));
    }

    #[test]
    fn test_unknown_code_language_falls_back_to_plaintext() {
        let html = render("```brainfudge
+++.
```

```Python
pass
```
");
        assert!(html.contains("<pre><code class=\"hljs language-plaintext\">+++.\n</code></pre>"));
        assert!(html.contains("<pre><code class=\"hljs language-Python\">pass\n</code></pre>"));
    }

    #[test]
    fn test_task_list_checkbox() {
        let tree = render_preview("- [x] done\n- [ ] todo\n", &RenderOptions::default());
        let inputs = tree.elements_by_tag(tree.root(), "input");
        assert_eq!(inputs.len(), 2);
        assert!(tree.has_attr(inputs[0], "checked"));
        assert!(!tree.has_attr(inputs[1], "checked"));
    }

    #[test]
    fn test_render_preview_expands_front_matter() {
        let tree = render_preview("---\ntitle: Doc\n---\nbody", &RenderOptions::default());
        assert_eq!(tree.get_attr(tree.root(), "class"), Some("preview"));
        let h1 = tree.elements_by_tag(tree.root(), "h1")[0];
        assert_eq!(tree.text_content(h1), "Doc");
    }
}
