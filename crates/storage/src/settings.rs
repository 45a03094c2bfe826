//! User-tunable autofill settings.

use serde::{Deserialize, Serialize};

/// Settings keys as stored in the `settings` table.
pub mod keys {
    pub const DEFAULT_ALWAYS_MATCH: &str = "default_always_match";
    pub const SCRUB_CLIPBOARD_EXTRA: &str = "scrub_clipboard_extra";
    pub const USERNAME_TTL_SECONDS: &str = "username_ttl_seconds";

    /// Every key [`super::AutofillSettings`] reads back.
    pub const ALL: [&str; 3] = [DEFAULT_ALWAYS_MATCH, SCRUB_CLIPBOARD_EXTRA, USERNAME_TTL_SECONDS];
}

/// Snapshot of the settings read at the start of each match cycle.
///
/// Missing or unreadable keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofillSettings {
    /// Use the first-match policy for identities without an override.
    pub default_always_match: bool,
    /// Overwrite the clipboard 20 extra times after a paste.
    pub scrub_clipboard_extra: bool,
    /// How long a decrypted username stays available for a second field.
    pub username_ttl_seconds: u64,
}

impl Default for AutofillSettings {
    fn default() -> Self {
        Self {
            default_always_match: true,
            scrub_clipboard_extra: false,
            username_ttl_seconds: 45,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s: AutofillSettings =
            serde_json::from_str(r#"{"scrub_clipboard_extra": true}"#).unwrap();
        assert!(s.scrub_clipboard_extra);
        assert!(s.default_always_match);
        assert_eq!(s.username_ttl_seconds, 45);
    }
}
