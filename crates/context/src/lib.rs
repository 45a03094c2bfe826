//! Foreground context awareness for passfill.
//!
//! This crate answers "what is the user looking at right now" for the
//! autofill engine. It tracks:
//! - Which identity emitted a UI notification (app package, crypto service, system shell)
//! - Whether the foreground surface is a web page (title + origin host) or a native app
//! - Which windows are still visible, so stale prompts can be dismissed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  identity.rs     - Well-known identities and heuristics      │
//! │  state.rs        - AppInfo, WebPage, ForegroundTarget        │
//! │  notification.rs - Raw UI notification shape                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Host Abstraction                           │
//! │  node.rs     - UiNode trait (scoped node handles)            │
//! │  provider.rs - Window, app metadata and overlay providers    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Detection                                  │
//! │  origin.rs - OriginDetector (web view + address bar lookup)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use passfill_context::{ActiveWindowProvider, OriginDetector};
//!
//! let detector = OriginDetector::new();
//! if let Some(root) = host.active_root() {
//!     match detector.detect(&root) {
//!         Some(page) => println!("web page {:?} at {:?}", page.title, page.origin),
//!         None => println!("native app"),
//!     }
//! }
//! ```

mod error;
mod identity;
mod node;
mod notification;
mod origin;
mod provider;
mod state;

pub use error::ContextError;
pub use identity::{
    is_browser, is_ignored_emitter, is_keyboard_identity, Identity, BROWSER_IDENTITIES,
    CRYPTO_SERVICE_IDENTITY, KEYBOARD_IDENTITY_MARKER, SYSTEM_SHELL_IDENTITY,
};
pub use node::{MemoryNode, UiNode, WindowId};
pub use notification::{NotificationKind, UiNotification};
pub use origin::{
    parse_origin_host, OriginDetector, ADDRESS_BAR_VIEW_IDS, DEFAULT_SEARCH_DEPTH, WEB_VIEW_CLASS,
};
pub use provider::{
    app_info, ActiveWindowProvider, AppMetadataProvider, NullNode, NullProvider, OverlayPermission,
};
pub use state::{AppInfo, ForegroundTarget, WebPage};
