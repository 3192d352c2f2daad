//! # wenyan
//!
//! The content pipeline of a Markdown authoring tool: theme a rendered
//! preview with CSS and export it to publishing platforms that each accept
//! a different subset of HTML.
//!
//! ## Pipeline
//!
//! Markdown → [`render`] → preview [`ContentTree`] → per-platform rewrites
//! in [`export`] → HTML string. Theme CSS is flattened by
//! [`css::resolve_variables`], parsed into a [`css::StyleSheet`] and
//! written onto elements by [`style::apply_styles`].
//!
//! ## Quick Start
//!
//! ```
//! use wenyan::{Platform, Session};
//!
//! let mut session = Session::default();
//! session.set_theme(":root { --accent: #c00; } #wenyan h1 { color: var(--accent); }");
//! session.set_content("# Hello\n\nSee [the docs](https://example.com).");
//! session.enable_footnotes(wenyan::FootnoteLayout::Paragraph);
//!
//! let html = session.export(Platform::Wechat)?;
//! assert!(html.contains("color: #c00;"));
//! assert!(html.contains(r#"<sup class="footnote">[1]</sup>"#));
//! # Ok::<(), wenyan::Error>(())
//! ```

pub mod config;
pub mod css;
pub mod dom;
pub mod error;
pub mod export;
pub mod footnote;
pub(crate) mod patterns;
pub mod render;
pub mod session;
pub mod style;

pub use config::{FontChoice, Loader, WenyanConfig};
pub use dom::{ContentTree, NodeId};
pub use error::{Error, Result};
pub use export::{ExportContext, Exporter, Platform, export};
pub use footnote::{FootnoteLayout, add_footnotes, remove_footnotes};
pub use session::Session;
