//! The single user-facing prompt and its lifecycle.
//!
//! ```text
//!            open_select                     choose / dismiss
//!   Idle ─────────────────► SelectPrompt ──────────────────────► Idle
//!    │                                         (Decrypt | Picker | PickAndMatch)
//!    │ open_username
//!    ▼                        paste / dismiss
//!   ConfirmUsernamePrompt ──────────────────────────────────────► Idle
//! ```
//!
//! Opening a prompt always closes the live one first, so at most one prompt
//! exists at any time.

use passfill_context::{is_keyboard_identity, Identity, NotificationKind, WindowId};
use passfill_events::{
    publish, EventBusRef, ExternalFlow, FlowRequested, PromptDismissed, PromptKind,
    SelectPromptShown, UsernamePromptShown,
};
use passfill_repository::{CandidateSet, CredentialRef};
use tracing::debug;

use crate::matching::MatchContext;

/// Item offering the full manual picker.
pub const PICK_ITEM: &str = "Pick…";
/// Item offering the picker that also records the pick as an override.
pub const PICK_AND_MATCH_ITEM: &str = "Pick and match…";

/// The live prompt.
pub enum PromptState<F> {
    Idle,
    SelectPrompt {
        candidates: CandidateSet,
        identity: Identity,
        label: String,
        is_web: bool,
        /// Window of the field the prompt was opened for.
        window: Option<WindowId>,
    },
    /// Holds no secret; the username is read back from the cache on paste.
    ConfirmUsernamePrompt { field: F, window: Option<WindowId> },
}

impl<F> PromptState<F> {
    fn kind(&self) -> Option<PromptKind> {
        match self {
            Self::Idle => None,
            Self::SelectPrompt { .. } => Some(PromptKind::Select),
            Self::ConfirmUsernamePrompt { .. } => Some(PromptKind::ConfirmUsername),
        }
    }

    fn window(&self) -> Option<WindowId> {
        match self {
            Self::Idle => None,
            Self::SelectPrompt { window, .. } | Self::ConfirmUsernamePrompt { window, .. } => *window,
        }
    }
}

/// What the user picked in the selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptChoice {
    /// Decrypt this candidate into the captured field.
    Decrypt(CredentialRef),
    /// The full picker was launched.
    Picker,
    /// The pick-and-match picker was launched.
    PickAndMatch,
}

/// Owns the [`PromptState`] and announces its changes on the event bus.
pub struct DialogStateMachine<F> {
    state: PromptState<F>,
    bus: EventBusRef,
}

impl<F> DialogStateMachine<F> {
    pub fn new(bus: EventBusRef) -> Self {
        Self {
            state: PromptState::Idle,
            bus,
        }
    }

    pub fn state(&self) -> &PromptState<F> {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, PromptState::Idle)
    }

    pub fn has_select_prompt(&self) -> bool {
        matches!(self.state, PromptState::SelectPrompt { .. })
    }

    /// Show the selection prompt for `context`.
    pub fn open_select(&mut self, context: MatchContext, window: Option<WindowId>) {
        self.dismiss();

        let candidate_count = context.candidates.len();
        let mut items = context.candidates.names();
        items.push(PICK_ITEM.to_string());
        items.push(PICK_AND_MATCH_ITEM.to_string());

        publish(
            self.bus.as_ref(),
            &SelectPromptShown {
                identity: context.identity.clone(),
                label: context.label.clone(),
                is_web: context.is_web,
                items,
                candidate_count,
            },
        );
        debug!(identity = %context.identity, candidate_count, "select prompt opened");

        self.state = PromptState::SelectPrompt {
            candidates: context.candidates,
            identity: context.identity,
            label: context.label,
            is_web: context.is_web,
            window,
        };
    }

    /// Offer to paste the cached username into `field`.
    pub fn open_username(&mut self, field: F, window: Option<WindowId>, username: &str) {
        self.dismiss();

        publish(
            self.bus.as_ref(),
            &UsernamePromptShown {
                username: username.to_string(),
            },
        );
        debug!("username prompt opened");

        self.state = PromptState::ConfirmUsernamePrompt { field, window };
    }

    /// Act on selection item `index` and close the prompt.
    ///
    /// Returns `None` when no selection prompt is live or the index is out
    /// of range; the prompt then stays open.
    pub fn choose(&mut self, index: usize) -> Option<PromptChoice> {
        let PromptState::SelectPrompt {
            candidates,
            identity,
            is_web,
            ..
        } = &self.state
        else {
            return None;
        };

        let count = candidates.len();
        let choice = if index < count {
            PromptChoice::Decrypt(candidates.get(index)?.clone())
        } else if index == count {
            self.request_flow(ExternalFlow::Picker);
            PromptChoice::Picker
        } else if index == count + 1 {
            self.request_flow(ExternalFlow::PickAndMatch {
                identity: identity.clone(),
                is_web: *is_web,
            });
            PromptChoice::PickAndMatch
        } else {
            debug!(index, count, "prompt choice out of range");
            return None;
        };

        self.dismiss();
        Some(choice)
    }

    /// Launch the override editor for the live selection prompt and close it.
    pub fn open_settings(&mut self) -> bool {
        let PromptState::SelectPrompt {
            identity,
            label,
            is_web,
            ..
        } = &self.state
        else {
            return false;
        };

        let flow = ExternalFlow::MatchSettings {
            identity: identity.clone(),
            label: label.clone(),
            is_web: *is_web,
        };
        self.request_flow(flow);
        self.dismiss();
        true
    }

    /// Take the username prompt's field, closing it.
    pub fn take_username_paste(&mut self) -> Option<F> {
        if !matches!(self.state, PromptState::ConfirmUsernamePrompt { .. }) {
            return None;
        }
        match std::mem::replace(&mut self.state, PromptState::Idle) {
            PromptState::ConfirmUsernamePrompt { field, .. } => {
                self.announce_dismissed(PromptKind::ConfirmUsername);
                Some(field)
            }
            _ => None,
        }
    }

    /// Close the username prompt, leaving a selection prompt alone.
    pub fn dismiss_username_prompt(&mut self) -> bool {
        if matches!(self.state, PromptState::ConfirmUsernamePrompt { .. }) {
            self.dismiss()
        } else {
            false
        }
    }

    /// Close the live prompt. Returns `true` if one was open.
    pub fn dismiss(&mut self) -> bool {
        let Some(kind) = self.state.kind() else {
            return false;
        };
        self.state = PromptState::Idle;
        self.announce_dismissed(kind);
        true
    }

    /// Close the live prompt if the window it belongs to is gone.
    ///
    /// `visible` is the host's window list. When the host cannot enumerate
    /// windows, every notification dismisses except a window change from an
    /// on-screen keyboard.
    pub fn dismiss_if_window_gone(
        &mut self,
        visible: Option<&[WindowId]>,
        kind: NotificationKind,
        emitter: Option<&str>,
    ) -> bool {
        if self.is_idle() {
            return false;
        }

        let gone = match visible {
            Some(windows) => !self
                .state
                .window()
                .is_some_and(|window| windows.contains(&window)),
            None => !(kind == NotificationKind::WindowStateChanged && is_keyboard_identity(emitter)),
        };

        if gone {
            self.dismiss()
        } else {
            false
        }
    }

    fn request_flow(&self, flow: ExternalFlow) {
        publish(self.bus.as_ref(), &FlowRequested { flow });
    }

    fn announce_dismissed(&self, kind: PromptKind) {
        publish(self.bus.as_ref(), &PromptDismissed { kind });
        debug!(?kind, "prompt dismissed");
    }
}
