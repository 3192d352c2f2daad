//! Platform exports.
//!
//! Every platform gets an [`Exporter`] that turns the preview tree into a
//! self-contained string. Exporters never touch the preview: each one
//! works on its own clone.
//!
//! # Example
//!
//! ```
//! use wenyan::ContentTree;
//! use wenyan::export::{ExportContext, Platform, export};
//!
//! let preview = ContentTree::parse("<h2><span>Hello</span></h2>");
//! let ctx = ExportContext {
//!     theme_css: "#wenyan h2 { color: #333; }".to_string(),
//!     ..ExportContext::default()
//! };
//! let html = export(Platform::Wechat, &preview, &ctx)?;
//! assert!(html.contains(r#"<h2 style="color: #333;">"#));
//! # Ok::<(), wenyan::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::info_span;

use crate::config::{FontChoice, WenyanConfig};
use crate::dom::ContentTree;
use crate::error::Result;

mod code;
mod generic;
mod lists;
mod long_image;
mod math;
mod medium;
mod table;
mod wechat;

pub use code::code_background;
pub use generic::{GenericExporter, JuejinExporter, ZhihuExporter};
pub use long_image::{
    EmbedFailure, EmbedReport, FileImageSource, ImageData, ImageSource, LongImage,
    prepare_long_image,
};
pub use medium::MediumExporter;
pub use table::{grid_from_rows, table_to_text};
pub use wechat::WechatExporter;

/// Everything an export needs besides the preview tree.
#[derive(Debug, Clone, Default)]
pub struct ExportContext {
    /// Theme stylesheet with custom properties already resolved
    pub theme_css: String,
    /// Code highlight stylesheet
    pub highlight_css: String,
    /// Preprocessed Markdown source (front matter expanded)
    pub markdown: String,
    pub font: FontChoice,
    pub config: WenyanConfig,
}

/// Trait for exporting the preview to a specific platform.
pub trait Exporter {
    /// Produce the platform's output from a read-only preview.
    fn export(&self, preview: &ContentTree, ctx: &ExportContext) -> Result<String>;
}

/// Export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// WeChat official accounts
    Wechat,
    Zhihu,
    Juejin,
    Medium,
    /// Plain HTML with embedded math images
    Generic,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Wechat,
        Platform::Zhihu,
        Platform::Juejin,
        Platform::Medium,
        Platform::Generic,
    ];

    pub fn exporter(self) -> &'static dyn Exporter {
        match self {
            Platform::Wechat => &WechatExporter,
            Platform::Zhihu => &ZhihuExporter,
            Platform::Juejin => &JuejinExporter,
            Platform::Medium => &MediumExporter,
            Platform::Generic => &GenericExporter,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Wechat => "wechat",
            Platform::Zhihu => "zhihu",
            Platform::Juejin => "juejin",
            Platform::Medium => "medium",
            Platform::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wechat" | "gzh" => Ok(Platform::Wechat),
            "zhihu" => Ok(Platform::Zhihu),
            "juejin" => Ok(Platform::Juejin),
            "medium" => Ok(Platform::Medium),
            "generic" | "html" => Ok(Platform::Generic),
            other => Err(format!("unknown platform `{other}`")),
        }
    }
}

/// Export the preview for `platform`.
pub fn export(platform: Platform, preview: &ContentTree, ctx: &ExportContext) -> Result<String> {
    let _span = info_span!("export", %platform).entered();
    platform.exporter().export(preview, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_names_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.name().parse::<Platform>(), Ok(platform));
        }
        assert_eq!("GZH".parse::<Platform>(), Ok(Platform::Wechat));
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_no_export_keeps_math_containers() {
        let preview = ContentTree::parse(
            r#"<p><mjx-container math="a"><svg class="x"></svg></mjx-container></p>"#,
        );
        let ctx = ExportContext::default();
        for platform in Platform::ALL {
            let out = export(platform, &preview, &ctx).unwrap();
            assert!(!out.contains("mjx-container"), "{platform}");
        }
    }
}
