//! Configuration loading.
//!
//! `defaults/wenyan.default.toml` is embedded into the crate so that the
//! documented defaults and runtime behavior stay in sync. Callers layer
//! user files and CLI overrides on top via [`Loader`] before deserializing
//! into [`WenyanConfig`]. Library users that need no file can rely on
//! [`WenyanConfig::default`], which mirrors the embedded TOML.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::footnote::FootnoteLayout;

const DEFAULT_TOML: &str = include_str!("../defaults/wenyan.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct WenyanConfig {
    pub fonts: FontConfig,
    pub code: CodeConfig,
    pub footnotes: FootnoteConfig,
    pub render: RenderConfig,
}

/// Font families used by the font override and code passes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub serif: String,
    pub sans: String,
    pub code: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            serif: r#""Noto Serif CJK SC", "Noto Serif SC", "Source Han Serif SC", "Source Han Serif", serif"#
                .to_string(),
            sans: r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif"#
                .to_string(),
            code: "'JetBrains Mono', Menlo, Consolas, Monaco, monospace".to_string(),
        }
    }
}

impl FontConfig {
    /// The family for a font choice, `None` for the theme's own font.
    pub fn family(&self, choice: FontChoice) -> Option<&str> {
        match choice {
            FontChoice::Theme => None,
            FontChoice::Serif => Some(&self.serif),
            FontChoice::Sans => Some(&self.sans),
        }
    }
}

/// Code block and inline code presentation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub font_size: String,
    pub line_height: String,
    pub padding: String,
    pub margin: String,
    pub border_radius: String,
    pub light_background: String,
    pub dark_background: String,
    /// Substrings that mark a highlight stylesheet as dark.
    pub dark_signatures: Vec<String>,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            font_size: "14px".to_string(),
            line_height: "1.5".to_string(),
            padding: "16px 20px".to_string(),
            margin: "16px 0".to_string(),
            border_radius: "4px".to_string(),
            light_background: "#f8f9fa".to_string(),
            dark_background: "#1e1e1e".to_string(),
            dark_signatures: vec![
                "background:#1e1e1e".to_string(),
                "background:#282c34".to_string(),
                "background:#272822".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FootnoteConfig {
    /// Heading text of the footnote section. Also identifies it on removal.
    pub title: String,
    /// Link colour used when the preview does not define one.
    pub link_color: String,
    pub layout: FootnoteLayout,
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            title: crate::footnote::FOOTNOTE_TITLE.to_string(),
            link_color: "#0069c2".to_string(),
            layout: FootnoteLayout::Paragraph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Emit a caption span after images with alt text.
    pub captions: bool,
}

/// Which font family the exported content uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    /// Leave the theme's font alone.
    #[default]
    Theme,
    Serif,
    Sans,
}

impl FromStr for FontChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "theme" => Ok(FontChoice::Theme),
            "serif" => Ok(FontChoice::Serif),
            "sans" => Ok(FontChoice::Sans),
            other => Err(format!("unknown font `{other}`, expected theme, serif or sans")),
        }
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontChoice::Theme => "theme",
            FontChoice::Serif => "serif",
            FontChoice::Sans => "sans",
        })
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<WenyanConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load only the embedded defaults.
pub fn load_defaults() -> Result<WenyanConfig, ConfigError> {
    Loader::new().build()
}
