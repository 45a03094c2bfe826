//! Identities and identity heuristics.
//!
//! Pure domain logic - no I/O, no host dependencies.

use serde::{Deserialize, Serialize};

/// Package identity of the external crypto service. Its own windows never get prompts.
pub const CRYPTO_SERVICE_IDENTITY: &str = "org.sufficientlysecure.keychain";

/// Package identity of the system shell (status bar, notification shade).
pub const SYSTEM_SHELL_IDENTITY: &str = "com.android.systemui";

/// Substring that marks an on-screen keyboard package.
pub const KEYBOARD_IDENTITY_MARKER: &str = "inputmethod";

/// Browsers whose content-changed notifications signal a page change.
pub const BROWSER_IDENTITIES: &[&str] = &["com.android.chrome", "com.android.browser"];

/// Key used for preference lookup and credential search.
///
/// Either a native application package (`com.example.bank`) or a web
/// origin host (`m.example.com`). Web origins are lower-cased by the
/// origin parser; package identities are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Notifications from these emitters must never start a match cycle.
pub fn is_ignored_emitter(emitter: Option<&str>) -> bool {
    matches!(emitter, Some(id) if id == CRYPTO_SERVICE_IDENTITY || id == SYSTEM_SHELL_IDENTITY)
}

/// Heuristic: an emitter whose package mentions "inputmethod" is a keyboard.
pub fn is_keyboard_identity(emitter: Option<&str>) -> bool {
    emitter.is_some_and(|id| id.contains(KEYBOARD_IDENTITY_MARKER))
}

pub fn is_browser(emitter: Option<&str>) -> bool {
    emitter.is_some_and(|id| BROWSER_IDENTITIES.contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_emitters() {
        assert!(is_ignored_emitter(Some(CRYPTO_SERVICE_IDENTITY)));
        assert!(is_ignored_emitter(Some(SYSTEM_SHELL_IDENTITY)));
        assert!(!is_ignored_emitter(Some("com.example.bank")));
        assert!(!is_ignored_emitter(None));
    }

    #[test]
    fn test_keyboard_heuristic() {
        assert!(is_keyboard_identity(Some("com.google.android.inputmethod.latin")));
        assert!(!is_keyboard_identity(Some("com.example.bank")));
        assert!(!is_keyboard_identity(None));
    }

    #[test]
    fn test_browser_identities() {
        assert!(is_browser(Some("com.android.chrome")));
        assert!(is_browser(Some("com.android.browser")));
        assert!(!is_browser(Some("org.mozilla.firefox")));
    }

    #[test]
    fn test_identity_display() {
        let id = Identity::from("m.example.com");
        assert_eq!(id.to_string(), "m.example.com");
        assert_eq!(id.as_str(), "m.example.com");
        assert!(!id.is_empty());
    }
}
