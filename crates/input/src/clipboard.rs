//! Clipboard access for paste-based injection.

use std::sync::{Arc, Mutex};

use crate::error::InputError;

/// Write access to the system clipboard.
pub trait ClipboardProvider: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), InputError>;
}

/// Type alias for shared clipboard reference.
pub type ClipboardRef = Arc<dyn ClipboardProvider>;

/// ClipboardProvider implementation using arboard.
pub struct PlatformClipboard;

impl PlatformClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlatformClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardProvider for PlatformClipboard {
    fn set_text(&self, text: &str) -> Result<(), InputError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| InputError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| InputError::Clipboard(e.to_string()))
    }
}

/// Clipboard that records every write. For tests.
#[derive(Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every value written, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("clipboard mutex poisoned").clone()
    }

    /// Current clipboard content.
    pub fn current(&self) -> Option<String> {
        self.writes.lock().expect("clipboard mutex poisoned").last().cloned()
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), InputError> {
        self.writes.lock().expect("clipboard mutex poisoned").push(text.to_string());
        Ok(())
    }
}
