//! Secret delivery into a captured field.

use std::sync::{Arc, Mutex};

use passfill_context::WindowId;

use crate::clipboard::ClipboardRef;
use crate::error::InputError;
use crate::FieldHandle;

/// Extra clipboard overwrites performed when extra scrubbing is enabled.
pub const CLIPBOARD_SCRUB_ROUNDS: usize = 20;

/// Options for one injection.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectOptions {
    /// Overwrite the clipboard [`CLIPBOARD_SCRUB_ROUNDS`] extra times after pasting.
    pub scrub_extra: bool,
}

/// Result of an injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectResult {
    /// The field accepted the focus request; a synthetic focus notification follows.
    pub reclaimed_focus: bool,
    /// The clipboard was used instead of setting text directly.
    pub used_clipboard: bool,
}

/// Delivers text into fields, falling back to clipboard paste.
pub struct FieldInjector {
    clipboard: ClipboardRef,
}

impl FieldInjector {
    pub fn new(clipboard: ClipboardRef) -> Self {
        Self { clipboard }
    }

    /// Focus `field` and put `text` into it.
    ///
    /// When the host cannot set text directly the text travels through the
    /// clipboard, which is blanked again whether or not the paste succeeded.
    pub fn inject<F: FieldHandle + ?Sized>(
        &self,
        field: &F,
        text: &str,
        options: InjectOptions,
    ) -> Result<InjectResult, InputError> {
        let reclaimed_focus = field.request_focus();

        if field.supports_set_text() {
            field.set_text(text)?;
            tracing::debug!(chars = text.chars().count(), "set field text directly");
            return Ok(InjectResult {
                reclaimed_focus,
                used_clipboard: false,
            });
        }

        self.clipboard.set_text(text)?;
        let pasted = field.paste();
        self.scrub(options.scrub_extra)?;
        pasted?;

        tracing::debug!(
            chars = text.chars().count(),
            scrub_extra = options.scrub_extra,
            "pasted field text via clipboard"
        );

        Ok(InjectResult {
            reclaimed_focus,
            used_clipboard: true,
        })
    }

    fn scrub(&self, extra: bool) -> Result<(), InputError> {
        self.clipboard.set_text("")?;
        if extra {
            for round in 0..CLIPBOARD_SCRUB_ROUNDS {
                self.clipboard.set_text(&round.to_string())?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FieldInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInjector").finish_non_exhaustive()
    }
}

/// In-memory field. Clones share state, like two handles to one host node.
#[derive(Debug, Clone)]
pub struct MemoryField {
    inner: Arc<Mutex<MemoryFieldState>>,
}

#[derive(Debug)]
struct MemoryFieldState {
    package: Option<String>,
    window: Option<WindowId>,
    can_set_text: bool,
    focus_requests: usize,
    text: Option<String>,
    pastes: usize,
}

impl MemoryField {
    pub fn new(package: &str, window: WindowId) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryFieldState {
                package: Some(package.to_string()),
                window: Some(window),
                can_set_text: true,
                focus_requests: 0,
                text: None,
                pastes: 0,
            })),
        }
    }

    /// A field on a host that can only paste.
    pub fn paste_only(self) -> Self {
        self.inner.lock().expect("field mutex poisoned").can_set_text = false;
        self
    }

    /// Text set directly on the field.
    pub fn text(&self) -> Option<String> {
        self.inner.lock().expect("field mutex poisoned").text.clone()
    }

    pub fn pastes(&self) -> usize {
        self.inner.lock().expect("field mutex poisoned").pastes
    }

    pub fn focus_requests(&self) -> usize {
        self.inner.lock().expect("field mutex poisoned").focus_requests
    }
}

impl FieldHandle for MemoryField {
    fn package_name(&self) -> Option<String> {
        self.inner.lock().expect("field mutex poisoned").package.clone()
    }

    fn window_id(&self) -> Option<WindowId> {
        self.inner.lock().expect("field mutex poisoned").window
    }

    fn request_focus(&self) -> bool {
        self.inner.lock().expect("field mutex poisoned").focus_requests += 1;
        true
    }

    fn supports_set_text(&self) -> bool {
        self.inner.lock().expect("field mutex poisoned").can_set_text
    }

    fn set_text(&self, text: &str) -> Result<(), InputError> {
        self.inner.lock().expect("field mutex poisoned").text = Some(text.to_string());
        Ok(())
    }

    fn paste(&self) -> Result<(), InputError> {
        self.inner.lock().expect("field mutex poisoned").pastes += 1;
        Ok(())
    }
}
