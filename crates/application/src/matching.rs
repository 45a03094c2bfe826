//! Candidate resolution for the current foreground target.

use std::sync::Arc;

use passfill_context::{ForegroundTarget, Identity};
use passfill_repository::{CandidateSet, CredentialIndex, PasswordStore, RepositoryError};
use passfill_storage::AutofillSettings;
use tracing::{debug, warn};

use crate::preferences::{MatchPolicy, PreferenceResolver};

type StoreOpener =
    Box<dyn Fn() -> Result<Arc<dyn PasswordStore>, RepositoryError> + Send + Sync>;

/// Password store opened on first use.
pub struct LazyStore {
    opener: StoreOpener,
    store: Option<Arc<dyn PasswordStore>>,
}

impl LazyStore {
    pub fn new<F>(opener: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PasswordStore>, RepositoryError> + Send + Sync + 'static,
    {
        Self {
            opener: Box::new(opener),
            store: None,
        }
    }

    /// Wrap a store that is already open.
    pub fn ready(store: Arc<dyn PasswordStore>) -> Self {
        let opener_store = Arc::clone(&store);
        Self {
            opener: Box::new(move || Ok(Arc::clone(&opener_store))),
            store: Some(store),
        }
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// The store, opening it if needed. A failed open is retried next call.
    pub fn get(&mut self) -> Result<Arc<dyn PasswordStore>, RepositoryError> {
        if let Some(store) = &self.store {
            return Ok(Arc::clone(store));
        }
        let store = (self.opener)()?;
        debug!(root = %store.root().display(), "password store initialized");
        self.store = Some(Arc::clone(&store));
        Ok(store)
    }
}

/// Everything the selection prompt needs for one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    /// Key for the "Settings" deep link: package, matched override key,
    /// origin, or page title, in that order of preference.
    pub identity: Identity,
    /// App label, or the identity for web pages.
    pub label: String,
    pub is_web: bool,
    pub candidates: CandidateSet,
}

/// Produces the candidate list for a foreground target.
pub struct MatchResolver {
    preferences: PreferenceResolver,
    store: LazyStore,
}

impl MatchResolver {
    pub fn new(preferences: PreferenceResolver, store: LazyStore) -> Self {
        Self { preferences, store }
    }

    pub fn preferences(&self) -> &PreferenceResolver {
        &self.preferences
    }

    pub fn store(&mut self) -> Result<Arc<dyn PasswordStore>, RepositoryError> {
        self.store.get()
    }

    pub fn resolve(&mut self, target: &ForegroundTarget, settings: &AutofillSettings) -> MatchContext {
        match target {
            ForegroundTarget::App(app) => {
                let policy = self.preferences.resolve_app(&app.package, settings);
                let candidates = self.candidates(&policy, &app.label);
                MatchContext {
                    identity: Identity::new(app.package.as_str()),
                    label: app.label.clone(),
                    is_web: false,
                    candidates,
                }
            }
            ForegroundTarget::Web(page) => {
                let (policy, identity) = match &page.origin {
                    Some(origin) => {
                        let resolution = self.preferences.resolve_web(origin, settings);
                        let key = resolution.matched_key.unwrap_or_else(|| origin.clone());
                        (resolution.policy, key)
                    }
                    None => (MatchPolicy::default_for(settings), page.title.clone()),
                };
                let candidates = self.candidates(&policy, &page.title);
                MatchContext {
                    label: identity.clone(),
                    identity: Identity::new(identity),
                    is_web: true,
                    candidates,
                }
            }
        }
    }

    /// Candidates for `policy`, searching by `label` for first-match.
    pub fn candidates(&mut self, policy: &MatchPolicy, label: &str) -> CandidateSet {
        if matches!(policy, MatchPolicy::Never) {
            return CandidateSet::empty();
        }

        let store = match self.store.get() {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "password store unavailable");
                return CandidateSet::empty();
            }
        };

        match policy {
            MatchPolicy::Never => CandidateSet::empty(),
            MatchPolicy::UseFirstMatch => CredentialIndex::search(store.as_ref(), "", label),
            MatchPolicy::ExplicitList(ids) => ids
                .iter()
                .filter(|id| store.contains(id))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passfill_context::{AppInfo, WebPage};
    use passfill_repository::{CredentialRef, FsPasswordStore};
    use passfill_storage::Database;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    fn store_with(files: &[&str]) -> (TempDir, Arc<dyn PasswordStore>) {
        let dir = tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"cipher").unwrap();
        }
        let store = FsPasswordStore::open(dir.path()).unwrap();
        (dir, Arc::new(store))
    }

    fn resolver(db: &Arc<Database>, store: Arc<dyn PasswordStore>) -> MatchResolver {
        MatchResolver::new(PreferenceResolver::new(db.clone()), LazyStore::ready(store))
    }

    fn bank_app() -> ForegroundTarget {
        ForegroundTarget::App(AppInfo {
            package: "com.example.bank".to_string(),
            label: "Example Bank".to_string(),
        })
    }

    #[test]
    fn test_first_match_searches_app_label() {
        let (_dir, store) = store_with(&["bank.gpg", "mail.gpg"]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mut matcher = resolver(&db, store);

        let ctx = matcher.resolve(&bank_app(), &AutofillSettings::default());
        assert_eq!(ctx.candidates.names(), vec!["bank"]);
        assert_eq!(ctx.identity.as_str(), "com.example.bank");
        assert_eq!(ctx.label, "Example Bank");
        assert!(!ctx.is_web);
    }

    #[test]
    fn test_never_ignores_store_contents() {
        let (_dir, store) = store_with(&["bank.gpg"]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.set_app_override("com.example.bank", "/never").unwrap();
        let mut matcher = resolver(&db, store);

        let ctx = matcher.resolve(&bank_app(), &AutofillSettings::default());
        assert!(ctx.candidates.is_empty());
    }

    #[test]
    fn test_explicit_list_keeps_order_and_drops_missing() {
        let (_dir, store) = store_with(&["bank.gpg", "web/bank.gpg"]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.set_app_override("com.example.bank", "web/bank\ngone\nbank")
            .unwrap();
        let mut matcher = resolver(&db, store);

        let ctx = matcher.resolve(&bank_app(), &AutofillSettings::default());
        let paths: Vec<_> = ctx.candidates.iter().map(CredentialRef::as_str).collect();
        assert_eq!(paths, vec!["web/bank", "bank"]);
    }

    #[test]
    fn test_web_searches_title_and_reports_override_key() {
        let (_dir, store) = store_with(&["example.gpg", "other.gpg"]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.set_web_override("example.com", "/first").unwrap();
        let mut matcher = resolver(&db, store);

        let target = ForegroundTarget::Web(WebPage {
            title: "Example - Sign in".to_string(),
            origin: Some("m.example.com".to_string()),
        });
        let ctx = matcher.resolve(&target, &AutofillSettings::default());
        assert_eq!(ctx.candidates.names(), vec!["example"]);
        assert_eq!(ctx.identity.as_str(), "example.com");
        assert_eq!(ctx.label, "example.com");
        assert!(ctx.is_web);
    }

    #[test]
    fn test_web_without_origin_uses_title() {
        let (_dir, store) = store_with(&["example.gpg"]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mut matcher = resolver(&db, store);

        let target = ForegroundTarget::Web(WebPage {
            title: "Example".to_string(),
            origin: None,
        });
        let ctx = matcher.resolve(&target, &AutofillSettings::default());
        assert_eq!(ctx.identity.as_str(), "Example");
        assert_eq!(ctx.candidates.names(), vec!["example"]);
    }

    #[test]
    fn test_store_opened_lazily_once() {
        let (dir, _) = store_with(&["bank.gpg"]);
        let root = dir.path().to_path_buf();
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = opens.clone();
        let lazy = LazyStore::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let store: Arc<dyn PasswordStore> = Arc::new(FsPasswordStore::open(&root)?);
            Ok(store)
        });
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mut matcher = MatchResolver::new(PreferenceResolver::new(db.clone()), lazy);

        assert_eq!(opens.load(Ordering::SeqCst), 0);
        matcher.resolve(&bank_app(), &AutofillSettings::default());
        matcher.resolve(&bank_app(), &AutofillSettings::default());
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_store_yields_nothing() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let lazy = LazyStore::new(|| {
            let store: Arc<dyn PasswordStore> = Arc::new(FsPasswordStore::open("/nonexistent/store")?);
            Ok(store)
        });
        let mut matcher = MatchResolver::new(PreferenceResolver::new(db.clone()), lazy);

        let ctx = matcher.resolve(&bank_app(), &AutofillSettings::default());
        assert!(ctx.candidates.is_empty());
    }
}
