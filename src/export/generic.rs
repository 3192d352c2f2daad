//! Exports that keep the preview markup and only deal with math.

use super::math::{math_to_data_uri, math_to_zhihu_images};
use super::{ExportContext, Exporter};
use crate::dom::ContentTree;
use crate::error::Result;

/// General-purpose HTML: formulas become self-contained SVG data URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericExporter;

impl Exporter for GenericExporter {
    fn export(&self, preview: &ContentTree, _ctx: &ExportContext) -> Result<String> {
        let mut tree = preview.clone();
        math_to_data_uri(&mut tree)?;
        Ok(tree.to_html())
    }
}

/// Zhihu re-renders formulas from the TeX in an `data-eeimg` image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZhihuExporter;

impl Exporter for ZhihuExporter {
    fn export(&self, preview: &ContentTree, _ctx: &ExportContext) -> Result<String> {
        let mut tree = preview.clone();
        math_to_zhihu_images(&mut tree);
        Ok(tree.to_html())
    }
}

/// Juejin takes Markdown, so the export is the preprocessed source.
#[derive(Debug, Clone, Copy, Default)]
pub struct JuejinExporter;

impl Exporter for JuejinExporter {
    fn export(&self, _preview: &ContentTree, ctx: &ExportContext) -> Result<String> {
        Ok(ctx.markdown.clone())
    }
}
