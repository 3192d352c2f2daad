//! Cached regex patterns shared by the CSS, style and export passes.
//!
//! Uses LazyLock to compile each pattern once on first use.

use regex_lite::Regex;
use std::sync::LazyLock;

// === Variables ===

/// Matches a custom property definition: `--name: value;`
pub static VAR_DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--([a-zA-Z0-9\-]+)\s*:\s*([^;]+);").unwrap());

/// Matches a `var(--name)` reference
pub static VAR_USAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\(--([a-zA-Z0-9\-]+)\)").unwrap());

/// Matches a whole `:root { ... }` block
pub static ROOT_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":root\s*\{[^}]*\}").unwrap());

/// Valid custom property name (after the leading `--`)
pub static VAR_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*$").unwrap());

// === Stylesheets ===

/// Matches any run of whitespace
pub static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Matches a `/* ... */` comment, across lines
pub static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Matches a trailing `!important` flag
pub static IMPORTANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*!\s*important\s*$").unwrap());

/// Matches the background colour inside an `.hljs { ... }` rule
pub static HLJS_BACKGROUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.hljs\s*\{[^}]*background(?:-color)?\s*:\s*(#[a-f0-9]+)[^}]*\}").unwrap()
});

// === Pseudo-element URLs ===

/// Matches an inline utf8 SVG data URI, capturing the percent-encoded markup
pub static SVG_UTF8_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)data:image/svg\+xml;utf8,(.*</svg>)").unwrap());

/// Matches a base64 SVG data URI inside `url(...)`
pub static SVG_BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data:image/svg\+xml;base64,([^"')]*)["']?\)"#).unwrap()
});

/// Matches a remote http(s) URL inside `url(...)`
pub static REMOTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:"|')?(https?[^"')]*)(?:"|')?\)"#).unwrap());

// === Markdown ===

/// Matches a display math block in a paragraph: `$$...$$` or `\[...\]`
pub static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$.*?\$\$|\\\[.*?\\\]").unwrap());

/// Matches a YAML front matter block at the start of a document
pub static FRONT_MATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").unwrap());

/// Matches runs of newlines
pub static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
