//! Error types for wenyan operations.

use thiserror::Error;

/// Errors that abort a single operation.
///
/// Soft failures (unparsable CSS, unknown selectors, unsupported pseudo
/// URLs) never surface here; they are logged and skipped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("malformed math: {0}")]
    MalformedMath(String),

    #[error("could not fetch image `{src}`: {reason}")]
    ImageFetch { src: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
