//! Credential search by identity text.

use tracing::{debug, warn};

use crate::credential::{CandidateSet, CredentialRef, EntryKind};
use crate::PasswordStore;

/// Searches a store for entries named inside a target string.
pub struct CredentialIndex;

impl CredentialIndex {
    /// Entries under `folder` whose base name occurs in `target`.
    ///
    /// Matching is a case-insensitive substring test of the entry name
    /// *within* the target (an entry `bank` matches the label
    /// `Example Bank`, not the other way round). Hidden entries and hidden
    /// folders are skipped. An absent or unreadable tree yields nothing.
    pub fn search(store: &dyn PasswordStore, folder: &str, target: &str) -> CandidateSet {
        let target = target.to_lowercase();
        let mut found = Vec::new();
        collect(store, folder, &target, &mut found);

        debug!(folder, matches = found.len(), "credential search finished");
        CandidateSet::from(found)
    }
}

fn collect(store: &dyn PasswordStore, folder: &str, target: &str, found: &mut Vec<CredentialRef>) {
    let entries = match store.list(folder) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(folder, error = %e, "failed to list store folder");
            return;
        }
    };

    for entry in entries.iter().filter(|e| !e.is_hidden) {
        match entry.kind {
            EntryKind::Folder => collect(store, &entry.path, target, found),
            EntryKind::Entry => {
                if !target.contains(&entry.name().to_lowercase()) {
                    continue;
                }
                match CredentialRef::parse(&entry.path) {
                    Ok(id) => found.push(id),
                    Err(e) => debug!(error = %e, "skipping unaddressable entry"),
                }
            }
        }
    }
}
