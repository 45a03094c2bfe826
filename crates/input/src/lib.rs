//! Text injection for passfill.
//!
//! Delivers a secret into the field captured at the start of a match cycle.
//!
//! # Safety Features
//!
//! - **Focus reclaim**: The field is asked to take focus back before any text is set
//! - **Direct set first**: Hosts that can set a field's text never touch the clipboard
//! - **Clipboard scrub**: Clipboard-based delivery blanks the clipboard right after
//!   pasting, optionally overwriting it 20 more times
//!
//! # Example
//!
//! ```ignore
//! use passfill_input::{FieldInjector, InjectOptions, PlatformClipboard};
//! use std::sync::Arc;
//!
//! let injector = FieldInjector::new(Arc::new(PlatformClipboard::new()));
//! let result = injector.inject(&field, "hunter2", InjectOptions::default())?;
//! ```

mod clipboard;
mod error;
mod injector;

use passfill_context::WindowId;

pub use clipboard::{ClipboardProvider, ClipboardRef, MemoryClipboard, PlatformClipboard};
pub use error::InputError;
pub use injector::{
    FieldInjector, InjectOptions, InjectResult, MemoryField, CLIPBOARD_SCRUB_ROUNDS,
};

/// Host handle to an input field.
///
/// Implement this for the host's focused-node type.
pub trait FieldHandle {
    /// Package identity of the app owning the field.
    fn package_name(&self) -> Option<String>;

    /// Window containing the field.
    fn window_id(&self) -> Option<WindowId>;

    /// Ask the field to take input focus.
    ///
    /// Returns `true` if the host performed the action (and will therefore
    /// emit a synthetic focus notification).
    fn request_focus(&self) -> bool;

    /// Whether the host can replace the field's text directly.
    fn supports_set_text(&self) -> bool;

    fn set_text(&self, text: &str) -> Result<(), InputError>;

    /// Paste the clipboard contents into the field.
    fn paste(&self) -> Result<(), InputError>;
}
