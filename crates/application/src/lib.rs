//! Match-and-decrypt engine for passfill.
//!
//! # Architecture
//!
//! ```text
//!  UiNotification ──► EventClassifier ──► OriginDetector / app metadata
//!                                               │
//!                                               ▼
//!                     PreferenceResolver ──► MatchResolver ──► CredentialIndex
//!                                               │
//!                                               ▼
//!                                      DialogStateMachine ──► EventBus (prompts)
//!                                               │ choice
//!                                               ▼
//!                                      CryptoOrchestrator ──► FieldInjector
//!                                               │
//!                                               └──► SecretCache (username TTL)
//! ```
//!
//! [`AutofillEngine`] wires these together behind one entry point per host
//! callback. Collaborators are injected through [`EngineParts`]; there is
//! no global instance.

mod classifier;
mod crypto;
mod dialog;
mod engine;
mod error;
mod host;
mod matching;
mod preferences;

pub use classifier::{Classification, EventClassifier, PromptView};
pub use crypto::{CryptoOrchestrator, DecryptOutcome, FillOutcome};
pub use dialog::{DialogStateMachine, PromptChoice, PromptState, PICK_AND_MATCH_ITEM, PICK_ITEM};
pub use engine::{AutofillEngine, EngineParts, FieldContext};
pub use error::EngineError;
pub use host::{Host, MemoryHost};
pub use matching::{LazyStore, MatchContext, MatchResolver};
pub use preferences::{
    MatchPolicy, PreferenceResolver, WebResolution, FIRST_MATCH_VALUE, NEVER_MATCH_VALUE,
};
