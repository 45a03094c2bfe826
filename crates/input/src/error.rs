//! Error types for text injection.

use thiserror::Error;

/// Errors that can occur while delivering text to a field.
#[derive(Debug, Error)]
pub enum InputError {
    /// The field refused the set-text action.
    #[error("field rejected the text")]
    SetTextRejected,

    /// The field refused the paste action.
    #[error("field rejected the paste action")]
    PasteRejected,

    /// Clipboard access failed.
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}
