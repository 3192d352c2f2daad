//! Medium export.
//!
//! Medium's editor imports pasted HTML with its own block model: block
//! quotes take plain text, code blocks carry their language in
//! `data-code-block-*` attributes, and there are no tables or nested lists.

use tracing::debug;

use super::lists::flatten_nested_lists;
use super::math::math_to_source_text;
use super::table::table_to_text;
use super::{ExportContext, Exporter};
use crate::dom::{ContentTree, NodeId, select};
use crate::error::Result;
use crate::patterns::NEWLINES_RE;

#[derive(Debug, Clone, Copy, Default)]
pub struct MediumExporter;

impl Exporter for MediumExporter {
    fn export(&self, preview: &ContentTree, _ctx: &ExportContext) -> Result<String> {
        let mut tree = preview.clone();
        blockquote_paragraphs_to_spans(&mut tree);
        annotate_code_blocks(&mut tree);
        tables_to_code_blocks(&mut tree);
        flatten_nested_lists(&mut tree);
        math_to_source_text(&mut tree);
        Ok(tree.to_html())
    }
}

fn mark_code_block(tree: &mut ContentTree, pre: NodeId, lang: &str) {
    tree.set_attr(pre, "data-code-block-lang", lang);
    tree.set_attr(pre, "data-code-block-mode", "2");
}

/// `blockquote p` becomes a span of its text followed by a blank line.
fn blockquote_paragraphs_to_spans(tree: &mut ContentTree) {
    for p in select(tree, tree.root(), "blockquote p") {
        let text = format!("{}\n\n", tree.inner_text(p));
        let span = tree.create_element("span", &[]);
        tree.set_text(span, text);
        tree.replace(p, span);
    }
}

/// Tag each `pre` with its language, strip highlight spans and collapse
/// blank lines, which Medium would otherwise treat as block boundaries.
fn annotate_code_blocks(tree: &mut ContentTree) {
    let blocks = tree.elements_by_tag(tree.root(), "pre");
    for &pre in &blocks {
        let code = tree.find_element(pre, |t, id| t.is_tag(id, "code"));
        let lang = code
            .and_then(|code| {
                tree.classes(code)
                    .find_map(|class| class.strip_prefix("language-"))
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "none".to_string());
        mark_code_block(tree, pre, &lang);

        let Some(code) = code else {
            continue;
        };
        for span in tree.elements_by_tag(code, "span") {
            tree.unwrap(span);
        }
        tree.merge_adjacent_text(code);
        for text in tree.text_nodes(code) {
            if let Some(content) = tree.text_mut(text) {
                *content = NEWLINES_RE.replace_all(content, "\n").into_owned();
            }
        }
    }
    debug!(count = blocks.len(), "annotated code blocks");
}

/// Replace each table by a code block holding its text grid.
fn tables_to_code_blocks(tree: &mut ContentTree) {
    let tables = tree.elements_by_tag(tree.root(), "table");
    for &table in &tables {
        let grid = table_to_text(tree, table);
        let pre = tree.create_element("pre", &[]);
        let code = tree.create_element("code", &[]);
        tree.set_text(code, grid);
        tree.append(pre, code);
        mark_code_block(tree, pre, "none");
        tree.replace(table, pre);
    }
    debug!(count = tables.len(), "converted tables");
}
