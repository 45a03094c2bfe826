//! Event contracts between the autofill engine and its host.
//!
//! The engine never draws UI or launches activities itself. It publishes
//! these DTOs on an [`EventBus`]; the host adapter renders prompts, shows
//! toasts and starts external flows. Shared types prevent mismatched field
//! names between producer and consumer.

mod bus;

pub use bus::{publish, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use passfill_context::Identity;
use serde::{Deserialize, Serialize};

/// An event with a fixed topic name.
pub trait OutboundEvent: Serialize {
    const TOPIC: &'static str;
}

/// Event emitted when the credential selection prompt opens.
///
/// Producers: dialog state machine
/// Consumers: host prompt renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectPromptShown {
    /// Identity used for the "Settings" deep link.
    pub identity: Identity,
    /// App label or page title.
    pub label: String,
    pub is_web: bool,
    /// Candidate names followed by the two picker actions.
    pub items: Vec<String>,
    /// Number of leading items that are candidates.
    pub candidate_count: usize,
}

impl OutboundEvent for SelectPromptShown {
    const TOPIC: &'static str = event_names::SELECT_PROMPT_SHOWN;
}

/// Event emitted when the "paste username" confirmation opens.
///
/// Producers: dialog state machine
/// Consumers: host prompt renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsernamePromptShown {
    pub username: String,
}

impl OutboundEvent for UsernamePromptShown {
    const TOPIC: &'static str = event_names::USERNAME_PROMPT_SHOWN;
}

/// Which prompt a dismissal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Select,
    ConfirmUsername,
}

/// Event emitted when the live prompt goes away.
///
/// Producers: dialog state machine
/// Consumers: host prompt renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDismissed {
    pub kind: PromptKind,
}

impl OutboundEvent for PromptDismissed {
    const TOPIC: &'static str = event_names::PROMPT_DISMISSED;
}

/// External interactive flows the host launches on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum ExternalFlow {
    /// Full manual picker over the whole store.
    Picker,
    /// Picker that also records the pick as the override for `identity`.
    PickAndMatch { identity: Identity, is_web: bool },
    /// Match-override editor for `identity`.
    MatchSettings {
        identity: Identity,
        label: String,
        is_web: bool,
    },
    /// Interactive step the crypto service needs (e.g., unlocking a key).
    Interaction { token: serde_json::Value },
}

/// Event emitted when an external flow must be started.
///
/// Producers: dialog state machine, crypto orchestrator
/// Consumers: host activity launcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequested {
    #[serde(flatten)]
    pub flow: ExternalFlow,
}

impl OutboundEvent for FlowRequested {
    const TOPIC: &'static str = event_names::FLOW_REQUESTED;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Error,
}

/// Event emitted for a transient, dismissible notice.
///
/// Producers: crypto orchestrator
/// Consumers: host notification surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

impl OutboundEvent for Toast {
    const TOPIC: &'static str = event_names::TOAST;
}

/// Event emitted after a password was delivered to a field.
///
/// Carries no secret material.
///
/// Producers: crypto orchestrator
/// Consumers: host (diagnostics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillCompleted {
    /// Store identifier of the credential.
    pub credential: String,
    #[serde(default)]
    pub used_clipboard: bool,
    /// Seconds the username stays available for pasting, if one was cached.
    #[serde(default)]
    pub username_ttl_secs: Option<u64>,
}

impl OutboundEvent for FillCompleted {
    const TOPIC: &'static str = event_names::FILL_COMPLETED;
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const SELECT_PROMPT_SHOWN: &str = "prompt:select_shown";
    pub const USERNAME_PROMPT_SHOWN: &str = "prompt:username_shown";
    pub const PROMPT_DISMISSED: &str = "prompt:dismissed";
    pub const FLOW_REQUESTED: &str = "flow:requested";
    pub const TOAST: &str = "notice:toast";
    pub const FILL_COMPLETED: &str = "fill:completed";
}
