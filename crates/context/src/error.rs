//! Error types for foreground context detection.

use thiserror::Error;

/// Errors raised while inspecting the foreground UI.
///
/// None of these are fatal: callers either skip the current cycle or
/// degrade to a less specific answer.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The active window root could not be obtained (it can vanish at any time).
    #[error("active window is unavailable")]
    WindowUnavailable,

    /// The host has no metadata for the package.
    #[error("no application metadata for {0}")]
    UnknownPackage(String),

    /// Address bar text could not be parsed as a URL.
    #[error("malformed origin text: {0}")]
    MalformedOrigin(String),
}
