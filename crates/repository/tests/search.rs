//! Integration tests for credential search over an on-disk store.

use passfill_repository::{CredentialIndex, FsPasswordStore, PasswordStore, RepositoryError};
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"-----BEGIN PGP MESSAGE-----").unwrap();
}

fn create_test_store(files: &[&str]) -> (TempDir, FsPasswordStore) {
    let dir = tempdir().unwrap();
    for file in files {
        touch(dir.path(), file);
    }
    let store = FsPasswordStore::open(dir.path()).expect("store should open");
    (dir, store)
}

// =============================================================================
// Matching Rules
// =============================================================================

mod matching {
    use super::*;

    #[test]
    fn test_entry_name_contained_in_target() {
        let (_dir, store) = create_test_store(&["bank.gpg", "mail.gpg"]);

        let found = CredentialIndex::search(&store, "", "Example Bank");
        assert_eq!(found.names(), vec!["bank"]);
    }

    #[test]
    fn test_target_contained_in_entry_name_does_not_match() {
        let (_dir, store) = create_test_store(&["examplebank.gpg"]);

        let found = CredentialIndex::search(&store, "", "bank");
        assert!(found.is_empty(), "only entry-in-target matches");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let (_dir, store) = create_test_store(&["GitHub.gpg"]);

        let found = CredentialIndex::search(&store, "", "Sign in to github · GitHub");
        assert_eq!(found.len(), 1);
        assert_eq!(found.get(0).unwrap().as_str(), "GitHub");
    }

    #[test]
    fn test_recurses_into_folders() {
        let (_dir, store) = create_test_store(&["web/bank.gpg", "apps/finance/bank.gpg"]);

        let found = CredentialIndex::search(&store, "", "bank");
        let ids: Vec<_> = found.iter().map(|c| c.as_str().to_string()).collect();
        assert_eq!(ids, vec!["apps/finance/bank", "web/bank"]);
    }
}

// =============================================================================
// Hidden Entries
// =============================================================================

mod hidden {
    use super::*;

    #[test]
    fn test_hidden_entries_never_match() {
        let (_dir, store) = create_test_store(&[".bank.gpg", "bank.gpg"]);

        let found = CredentialIndex::search(&store, "", "bank .bank");
        assert_eq!(found.names(), vec!["bank"]);
    }

    #[test]
    fn test_hidden_subtrees_are_skipped() {
        let (_dir, store) = create_test_store(&[".archive/bank.gpg", "visible/bank.gpg"]);

        let found = CredentialIndex::search(&store, "", "bank");
        assert_eq!(found.len(), 1);
        assert_eq!(found.get(0).unwrap().as_str(), "visible/bank");
    }
}

// =============================================================================
// Store Shape
// =============================================================================

mod shape {
    use super::*;

    #[test]
    fn test_empty_store_yields_nothing() {
        let (_dir, store) = create_test_store(&[]);
        assert!(CredentialIndex::search(&store, "", "anything").is_empty());
    }

    #[test]
    fn test_store_removed_after_open_yields_nothing() {
        let (dir, store) = create_test_store(&["bank.gpg"]);
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(CredentialIndex::search(&store, "", "bank").is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let (_dir, store) = create_test_store(&["bank.gpg", "b/bank.gpg", "a/bank.gpg"]);

        let first = CredentialIndex::search(&store, "", "bank");
        let second = CredentialIndex::search(&store, "", "bank");
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_rejects_escaping_folder() {
        let (_dir, store) = create_test_store(&["bank.gpg"]);
        assert!(matches!(
            store.list("../"),
            Err(RepositoryError::InvalidIdentifier(_))
        ));
    }
}
