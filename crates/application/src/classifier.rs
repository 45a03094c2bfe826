//! Triage of raw UI notifications.

use passfill_context::{is_ignored_emitter, NotificationKind, OverlayPermission, UiNotification};
use tracing::{debug, info};

/// What the engine should do with one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Ignore,
    /// Close the live prompt if its window went away.
    DismissStalePrompt,
    /// Close the live prompt unconditionally; no new cycle.
    DismissPrompt,
    /// Offer the cached username for the (non-password) source field.
    OfferUsernamePaste,
    /// Capture the source field and match credentials for it.
    BeginMatchCycle,
}

/// Engine state the rules depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptView {
    /// An unexpired credential with a username is cached.
    pub has_cached_username: bool,
    /// A selection prompt is live.
    pub select_prompt_live: bool,
}

/// Applies the triage rules, in order:
///
/// 1. Notifications from the crypto service or system shell, and content
///    changes, only dismiss stale prompts.
/// 2. Non-password sources offer the cached username on focus of an
///    editable field, otherwise dismiss stale prompts.
/// 3. With a selection prompt live, clicks are ignored; anything else
///    replaces the prompt.
/// 4. A new cycle needs overlay permission and a source node.
///
/// The focus notification caused by our own focus reclaim is swallowed
/// once via [`EventClassifier::suppress_next_focus`].
#[derive(Debug, Default)]
pub struct EventClassifier {
    suppress_focus: bool,
}

impl EventClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore the next notification that would open a prompt.
    pub fn suppress_next_focus(&mut self) {
        self.suppress_focus = true;
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppress_focus
    }

    pub fn classify<F>(
        &mut self,
        notification: &UiNotification<F>,
        view: PromptView,
        overlay: &dyn OverlayPermission,
    ) -> Classification {
        if is_ignored_emitter(notification.emitter())
            || notification.kind == NotificationKind::WindowContentChanged
        {
            return Classification::DismissStalePrompt;
        }

        if !notification.is_password {
            let offer = view.has_cached_username
                && notification.is_editable
                && notification.kind == NotificationKind::ViewFocused
                && notification.source.is_some();
            if !offer {
                return Classification::DismissStalePrompt;
            }
            if self.take_suppression() {
                return Classification::Ignore;
            }
            return Classification::OfferUsernamePaste;
        }

        if view.select_prompt_live && notification.kind == NotificationKind::ViewClicked {
            return Classification::Ignore;
        }
        // Past this point a live prompt is replaced or closed.
        let stop = if view.select_prompt_live {
            Classification::DismissPrompt
        } else {
            Classification::Ignore
        };

        if self.take_suppression() {
            return stop;
        }

        if !overlay.can_draw_overlays() {
            info!("overlay permission missing, requesting it");
            overlay.request_overlay_permission();
            return stop;
        }

        if notification.source.is_none() {
            debug!("password notification without a source node");
            return stop;
        }

        Classification::BeginMatchCycle
    }

    fn take_suppression(&mut self) -> bool {
        let suppressed = std::mem::take(&mut self.suppress_focus);
        if suppressed {
            debug!("ignoring focus caused by focus reclaim");
        }
        suppressed
    }
}
