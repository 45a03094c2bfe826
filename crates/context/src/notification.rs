//! Raw UI notifications delivered by the host.

use serde::{Deserialize, Serialize};

/// Kind of UI-state notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A view gained input focus.
    ViewFocused,
    /// A view was clicked.
    ViewClicked,
    /// A window appeared, disappeared or changed state (includes keyboards).
    WindowStateChanged,
    /// Content inside a window changed.
    WindowContentChanged,
    /// Anything else the host forwards.
    Other,
}

/// One notification from the host UI stream.
///
/// `F` is the host's handle to the focused node; it is only present when
/// the host could resolve the notification source.
#[derive(Debug, Clone)]
pub struct UiNotification<F> {
    pub kind: NotificationKind,
    /// Package identity of the emitting application, if known.
    pub emitter: Option<String>,
    pub source: Option<F>,
    pub is_password: bool,
    pub is_editable: bool,
}

impl<F> UiNotification<F> {
    pub fn new(kind: NotificationKind, emitter: impl Into<String>) -> Self {
        Self {
            kind,
            emitter: Some(emitter.into()),
            source: None,
            is_password: false,
            is_editable: false,
        }
    }

    pub fn with_source(mut self, source: F) -> Self {
        self.source = Some(source);
        self
    }

    /// Mark the source as a password input (password inputs are editable).
    pub fn password(mut self) -> Self {
        self.is_password = true;
        self.is_editable = true;
        self
    }

    pub fn editable(mut self) -> Self {
        self.is_editable = true;
        self
    }

    pub fn emitter(&self) -> Option<&str> {
        self.emitter.as_deref()
    }
}
