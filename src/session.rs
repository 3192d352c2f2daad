//! Editing session state.
//!
//! A [`Session`] holds everything that used to be ambient in an editor:
//! the configuration, the resolved theme, the highlight sheet, the current
//! Markdown and its preview tree, and the footnote/caption/font toggles.
//! Exports are pure functions of the preview and the [`ExportContext`] the
//! session hands out.

use tracing::debug;

use crate::config::{FontChoice, WenyanConfig};
use crate::css::resolve_variables;
use crate::dom::ContentTree;
use crate::error::Result;
use crate::export::{ExportContext, ImageSource, LongImage, Platform, export, prepare_long_image};
use crate::footnote::{FootnoteLayout, add_footnotes_titled, current_layout, remove_footnotes_titled};
use crate::render::{RenderOptions, preprocess, render_markdown};

#[derive(Debug, Clone)]
pub struct Session {
    config: WenyanConfig,
    theme_css: String,
    highlight_css: String,
    markdown: String,
    preview: ContentTree,
    footnotes_enabled: bool,
    footnote_layout: FootnoteLayout,
    captions: bool,
    font: FontChoice,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(WenyanConfig::default())
    }
}

impl Session {
    pub fn new(config: WenyanConfig) -> Self {
        Self {
            footnote_layout: config.footnotes.layout,
            captions: config.render.captions,
            config,
            theme_css: String::new(),
            highlight_css: String::new(),
            markdown: String::new(),
            preview: ContentTree::new(),
            footnotes_enabled: false,
            font: FontChoice::Theme,
        }
    }

    pub fn config(&self) -> &WenyanConfig {
        &self.config
    }

    /// The read-only preview tree.
    pub fn preview(&self) -> &ContentTree {
        &self.preview
    }

    /// Markdown after front matter expansion.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// The theme with custom properties resolved.
    pub fn theme_css(&self) -> &str {
        &self.theme_css
    }

    pub fn highlight_css(&self) -> &str {
        &self.highlight_css
    }

    pub fn footnotes_enabled(&self) -> bool {
        self.footnotes_enabled
    }

    pub fn footnote_layout(&self) -> FootnoteLayout {
        self.footnote_layout
    }

    pub fn font(&self) -> FontChoice {
        self.font
    }

    pub fn captions(&self) -> bool {
        self.captions
    }

    /// Render new content and re-apply footnotes if they are enabled.
    pub fn set_content(&mut self, markdown: &str) {
        self.markdown = preprocess(markdown);
        self.rebuild_preview();
    }

    /// Use an already rendered preview (e.g. HTML produced by a host
    /// renderer) instead of Markdown.
    pub fn set_preview_html(&mut self, html: &str) {
        self.markdown.clear();
        self.preview = ContentTree::parse(html);
        if self.footnotes_enabled {
            self.annotate();
        }
    }

    /// Install a theme. Footnotes are re-annotated, keeping their layout.
    pub fn set_theme(&mut self, css: &str) {
        self.theme_css = resolve_variables(css);
        if self.footnotes_enabled {
            let layout = current_layout(&self.preview).unwrap_or(self.footnote_layout);
            remove_footnotes_titled(&mut self.preview, &self.config.footnotes.title);
            self.footnote_layout = layout;
            self.annotate();
        }
    }

    pub fn set_highlight(&mut self, css: &str) {
        self.highlight_css = css.to_string();
    }

    /// Toggle image captions; the preview is re-rendered from Markdown.
    pub fn set_captions(&mut self, enabled: bool) {
        if self.captions != enabled {
            self.captions = enabled;
            self.rebuild_preview();
        }
    }

    pub fn set_font(&mut self, font: FontChoice) {
        self.font = font;
    }

    pub fn enable_footnotes(&mut self, layout: FootnoteLayout) {
        if self.footnotes_enabled && self.footnote_layout != layout {
            remove_footnotes_titled(&mut self.preview, &self.config.footnotes.title);
        }
        self.footnotes_enabled = true;
        self.footnote_layout = layout;
        self.annotate();
    }

    pub fn disable_footnotes(&mut self) {
        remove_footnotes_titled(&mut self.preview, &self.config.footnotes.title);
        self.footnotes_enabled = false;
    }

    /// The context exporters run with.
    pub fn export_context(&self) -> ExportContext {
        ExportContext {
            theme_css: self.theme_css.clone(),
            highlight_css: self.highlight_css.clone(),
            markdown: self.markdown.clone(),
            font: self.font,
            config: self.config.clone(),
        }
    }

    pub fn export(&self, platform: Platform) -> Result<String> {
        export(platform, &self.preview, &self.export_context())
    }

    pub fn long_image(&self, source: &dyn ImageSource) -> Result<LongImage> {
        prepare_long_image(&self.preview, source)
    }

    fn rebuild_preview(&mut self) {
        if self.markdown.is_empty() {
            self.preview = ContentTree::new();
        } else {
            let options = RenderOptions {
                captions: self.captions,
            };
            self.preview = ContentTree::parse(&render_markdown(&self.markdown, &options));
        }
        if self.footnotes_enabled {
            self.annotate();
        }
    }

    fn annotate(&mut self) {
        let notes = add_footnotes_titled(
            &mut self.preview,
            self.footnote_layout,
            &self.config.footnotes.title,
        );
        debug!(count = notes.len(), "annotated preview");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::select;

    const DOC: &str = "---\ntitle: Post\n---\nRead [the docs](https://docs.example).\n\n![fig](a.png)\n";

    fn marker_count(session: &Session) -> usize {
        select(session.preview(), session.preview().root(), "sup.footnote").len()
    }

    #[test]
    fn test_content_is_preprocessed() {
        let mut session = Session::default();
        session.set_content(DOC);
        assert!(session.markdown().starts_with("# Post\n\n"));
        let out = session.export(Platform::Juejin).unwrap();
        assert_eq!(out, session.markdown());
    }

    #[test]
    fn test_footnotes_survive_content_changes() {
        let mut session = Session::default();
        session.set_content(DOC);
        session.enable_footnotes(FootnoteLayout::List);
        assert_eq!(marker_count(&session), 1);

        session.set_content("[a](u1) [b](u2)");
        assert_eq!(marker_count(&session), 2);
        assert_eq!(current_layout(session.preview()), Some(FootnoteLayout::List));

        session.disable_footnotes();
        assert_eq!(marker_count(&session), 0);
        session.set_content("[a](u1)");
        assert_eq!(marker_count(&session), 0);
    }

    #[test]
    fn test_theme_change_keeps_layout() {
        let mut session = Session::default();
        session.set_content(DOC);
        session.enable_footnotes(FootnoteLayout::List);
        session.set_theme(":root { --c: red; } a { color: var(--c); }");
        assert_eq!(session.theme_css().trim(), "a { color: red; }");
        assert_eq!(marker_count(&session), 1);
        assert_eq!(current_layout(session.preview()), Some(FootnoteLayout::List));
    }

    #[test]
    fn test_switching_layout() {
        let mut session = Session::default();
        session.set_content(DOC);
        session.enable_footnotes(FootnoteLayout::Paragraph);
        session.enable_footnotes(FootnoteLayout::List);
        assert_eq!(marker_count(&session), 1);
        assert_eq!(current_layout(session.preview()), Some(FootnoteLayout::List));
    }

    #[test]
    fn test_captions_toggle_rerenders() {
        let mut session = Session::default();
        session.set_content(DOC);
        assert!(select(session.preview(), session.preview().root(), "img + span").is_empty());
        session.set_captions(true);
        assert_eq!(
            select(session.preview(), session.preview().root(), "img + span").len(),
            1
        );
    }

    #[test]
    fn test_export_uses_session_state() {
        let mut session = Session::default();
        session.set_content(DOC);
        session.set_theme("#wenyan { color: #111; }");
        session.set_font(FontChoice::Sans);
        let html = session.export(Platform::Wechat).unwrap();
        assert!(html.contains(r#"data-provider="WenYan""#));
        assert!(html.contains("font-family: -apple-system"));
    }
}
