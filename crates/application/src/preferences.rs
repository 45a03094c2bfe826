//! Per-identity match policy resolution.

use std::sync::Arc;

use passfill_repository::CredentialRef;
use passfill_storage::{AutofillSettings, PreferenceRepository};
use tracing::{debug, warn};

/// Stored value meaning "use the first matching entries".
pub const FIRST_MATCH_VALUE: &str = "/first";
/// Stored value meaning "never match".
pub const NEVER_MATCH_VALUE: &str = "/never";

/// How credentials are matched for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPolicy {
    UseFirstMatch,
    Never,
    /// Fixed entries, offered in this order when they exist.
    ExplicitList(Vec<CredentialRef>),
}

impl MatchPolicy {
    /// Decode a stored override value.
    ///
    /// Anything other than `/first` or `/never` is a newline-separated list
    /// of store identifiers; blank and unaddressable lines are skipped.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            FIRST_MATCH_VALUE => Self::UseFirstMatch,
            NEVER_MATCH_VALUE => Self::Never,
            list => Self::ExplicitList(
                list.lines()
                    .filter(|line| !line.trim().is_empty())
                    .filter_map(|line| match CredentialRef::parse(line) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            debug!(error = %e, "skipping override entry");
                            None
                        }
                    })
                    .collect(),
            ),
        }
    }

    /// Policy for identities without an override.
    pub fn default_for(settings: &AutofillSettings) -> Self {
        if settings.default_always_match {
            Self::UseFirstMatch
        } else {
            Self::Never
        }
    }
}

/// A web policy plus the override key it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResolution {
    pub policy: MatchPolicy,
    /// Override key that matched the origin, if any.
    pub matched_key: Option<String>,
}

/// Resolves [`MatchPolicy`] from stored overrides and the global default.
///
/// Storage failures are logged and treated as "no override".
pub struct PreferenceResolver {
    preferences: Arc<dyn PreferenceRepository>,
}

impl PreferenceResolver {
    pub fn new(preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { preferences }
    }

    /// Current settings, or defaults if they cannot be read.
    pub fn settings(&self) -> AutofillSettings {
        self.preferences.settings().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read settings, using defaults");
            AutofillSettings::default()
        })
    }

    /// Policy for a native app. Overrides are keyed by exact package name.
    pub fn resolve_app(&self, package: &str, settings: &AutofillSettings) -> MatchPolicy {
        match self.preferences.app_override(package) {
            Ok(Some(value)) => MatchPolicy::parse(&value),
            Ok(None) => MatchPolicy::default_for(settings),
            Err(e) => {
                warn!(package, error = %e, "failed to read app override");
                MatchPolicy::default_for(settings)
            }
        }
    }

    /// Policy for a web origin.
    ///
    /// A key matches when it contains the origin or the origin contains it,
    /// ignoring case. Keys with empty values never match. The longest
    /// matching key wins; among equally long keys the last one read wins.
    pub fn resolve_web(&self, origin: &str, settings: &AutofillSettings) -> WebResolution {
        let overrides = self.preferences.web_overrides().unwrap_or_else(|e| {
            warn!(origin, error = %e, "failed to read web overrides");
            Vec::new()
        });

        let origin_lower = origin.to_lowercase();
        let mut best: Option<(String, String)> = None;
        for (key, value) in overrides {
            if value.is_empty() {
                continue;
            }
            let key_lower = key.to_lowercase();
            if !origin_lower.contains(&key_lower) && !key_lower.contains(&origin_lower) {
                continue;
            }
            if best.as_ref().map_or(true, |(k, _)| key.len() >= k.len()) {
                best = Some((key, value));
            }
        }

        match best {
            Some((key, value)) => {
                debug!(origin, key = %key, "web override matched");
                WebResolution {
                    policy: MatchPolicy::parse(&value),
                    matched_key: Some(key),
                }
            }
            None => WebResolution {
                policy: MatchPolicy::default_for(settings),
                matched_key: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passfill_storage::Database;

    fn resolver() -> (Arc<Database>, PreferenceResolver) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = PreferenceResolver::new(db.clone());
        (db, resolver)
    }

    fn ids(list: &[&str]) -> Vec<CredentialRef> {
        list.iter().map(|s| CredentialRef::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(MatchPolicy::parse("/first"), MatchPolicy::UseFirstMatch);
        assert_eq!(MatchPolicy::parse("/never\n"), MatchPolicy::Never);
        assert_eq!(
            MatchPolicy::parse("bank\n\nweb/bank\n"),
            MatchPolicy::ExplicitList(ids(&["bank", "web/bank"]))
        );
    }

    #[test]
    fn test_default_follows_setting() {
        let (db, resolver) = resolver();
        let settings = AutofillSettings::default();
        assert_eq!(
            resolver.resolve_app("com.example.bank", &settings),
            MatchPolicy::UseFirstMatch
        );
        assert_eq!(
            resolver.resolve_web("example.com", &settings).policy,
            MatchPolicy::UseFirstMatch
        );

        let off = AutofillSettings {
            default_always_match: false,
            ..AutofillSettings::default()
        };
        db.save_settings(&off).unwrap();
        let settings = resolver.settings();
        assert_eq!(resolver.resolve_app("com.example.bank", &settings), MatchPolicy::Never);
    }

    #[test]
    fn test_app_override_is_exact() {
        let (db, resolver) = resolver();
        db.set_app_override("com.example.bank", "/never").unwrap();
        let settings = AutofillSettings::default();

        assert_eq!(resolver.resolve_app("com.example.bank", &settings), MatchPolicy::Never);
        assert_eq!(
            resolver.resolve_app("com.example.bank.beta", &settings),
            MatchPolicy::UseFirstMatch
        );
    }

    #[test]
    fn test_web_override_matches_both_directions() {
        let (db, resolver) = resolver();
        db.set_web_override("Example.com", "/never").unwrap();
        let settings = AutofillSettings::default();

        let sub = resolver.resolve_web("m.example.com", &settings);
        assert_eq!(sub.policy, MatchPolicy::Never);
        assert_eq!(sub.matched_key.as_deref(), Some("Example.com"));

        let sup = resolver.resolve_web("example", &settings);
        assert_eq!(sup.policy, MatchPolicy::Never);

        let other = resolver.resolve_web("example.org", &settings);
        assert_eq!(other.policy, MatchPolicy::UseFirstMatch);
        assert_eq!(other.matched_key, None);
    }

    #[test]
    fn test_empty_web_value_is_pass_through() {
        let (db, resolver) = resolver();
        db.set_web_override("example.com", "").unwrap();
        let settings = AutofillSettings {
            default_always_match: false,
            ..AutofillSettings::default()
        };

        let resolution = resolver.resolve_web("example.com", &settings);
        assert_eq!(resolution.policy, MatchPolicy::Never);
        assert_eq!(resolution.matched_key, None);
    }

    #[test]
    fn test_longest_key_wins() {
        let (db, resolver) = resolver();
        db.set_web_override("mail.example.com", "web/mail").unwrap();
        db.set_web_override("example.com", "/never").unwrap();
        let settings = AutofillSettings::default();

        let resolution = resolver.resolve_web("mail.example.com", &settings);
        assert_eq!(resolution.policy, MatchPolicy::ExplicitList(ids(&["web/mail"])));
        assert_eq!(resolution.matched_key.as_deref(), Some("mail.example.com"));
    }

    #[test]
    fn test_equal_length_tie_goes_to_last_written() {
        let (db, resolver) = resolver();
        db.set_web_override("a.example", "/never").unwrap();
        db.set_web_override("b.example", "/first").unwrap();
        let settings = AutofillSettings::default();

        // Both keys contain the origin "example".
        let resolution = resolver.resolve_web("example", &settings);
        assert_eq!(resolution.matched_key.as_deref(), Some("b.example"));
        assert_eq!(resolution.policy, MatchPolicy::UseFirstMatch);
    }
}
