//! Preparing the preview for rasterization into a long image.
//!
//! The host screenshots a detached copy of the content, so every image has
//! to be embedded as a data URI first. Rasterization itself happens in the
//! host; this module only produces the self-contained markup.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use super::math::inline_math_svg;
use crate::dom::ContentTree;
use crate::error::{Error, Result};

/// MIME type assumed when a source does not report one.
const FALLBACK_MIME: &str = "image/png";

/// Raw image bytes and their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Where image bytes come from. Network access is the host's business;
/// the crate ships [`FileImageSource`] for local files.
pub trait ImageSource {
    fn fetch(&self, src: &str) -> Result<ImageData>;
}

/// Reads images from disk, resolving relative paths against a base
/// directory. `file://` URLs are accepted; other schemes fail.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    base: PathBuf,
}

impl FileImageSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, src: &str) -> Result<PathBuf> {
        let path = match src.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => {
                return Err(Error::ImageFetch {
                    src: src.to_string(),
                    reason: format!("unsupported scheme `{scheme}`"),
                });
            }
            None => src,
        };
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let path = Path::new(decoded.as_ref());
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        })
    }
}

impl ImageSource for FileImageSource {
    fn fetch(&self, src: &str) -> Result<ImageData> {
        let path = self.resolve(src)?;
        let bytes = fs::read(&path).map_err(|err| Error::ImageFetch {
            src: src.to_string(),
            reason: err.to_string(),
        })?;
        Ok(ImageData {
            mime: mime_for_path(&path).to_string(),
            bytes,
        })
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_MIME,
    }
}

/// One image that could not be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFailure {
    pub src: String,
    pub reason: String,
}

/// Outcome of embedding images: the failures are reported together so the
/// caller can surface a single notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: usize,
    pub failures: Vec<EmbedFailure>,
}

impl EmbedReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Markup ready for rasterization.
#[derive(Debug, Clone)]
pub struct LongImage {
    pub html: String,
    pub report: EmbedReport,
}

/// Clone the preview, embed every image through `source` and inline math
/// SVG. An image that fails keeps its original `src` and is recorded in
/// the report; malformed math aborts.
pub fn prepare_long_image(preview: &ContentTree, source: &dyn ImageSource) -> Result<LongImage> {
    let mut tree = preview.clone();
    let mut report = EmbedReport::default();

    for img in tree.elements_by_tag(tree.root(), "img") {
        let Some(src) = tree.get_attr(img, "src").map(str::to_string) else {
            continue;
        };
        if src.starts_with("data:") {
            continue;
        }
        match source.fetch(&src) {
            Ok(data) => {
                tree.set_attr(img, "src", &data.to_data_uri());
                report.embedded += 1;
            }
            Err(err) => {
                warn!(%src, %err, "could not embed image");
                report.failures.push(EmbedFailure {
                    src,
                    reason: err.to_string(),
                });
            }
        }
    }

    inline_math_svg(&mut tree)?;
    debug!(
        embedded = report.embedded,
        failed = report.failures.len(),
        "prepared long image"
    );

    Ok(LongImage {
        html: tree.to_html(),
        report,
    })
}
