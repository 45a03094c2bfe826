//! Credential references and candidate sets.

use serde::{Deserialize, Serialize};

use crate::RepositoryError;

/// Reference to one encrypted entry: its store-relative path without the
/// `.gpg` extension, e.g. `web/bank`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    /// Validate a store-relative identifier.
    ///
    /// Leading slashes are stripped; empty, parent (`..`) and current (`.`)
    /// components are rejected so an identifier can never leave the store.
    pub fn parse(value: &str) -> Result<Self, RepositoryError> {
        let trimmed = value.trim().trim_start_matches('/');
        let valid = !trimmed.is_empty()
            && trimmed
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..");

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(RepositoryError::InvalidIdentifier(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component, shown to the user.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Entry,
    Folder,
}

/// One item of a store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Store-relative path; entries carry no extension.
    pub path: String,
    pub kind: EntryKind,
    pub is_hidden: bool,
}

impl StoreEntry {
    /// Base identifier: the last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Ordered credentials offered for one context.
///
/// Replaced wholesale on every new context, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet(Vec<CredentialRef>);

impl CandidateSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CredentialRef> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialRef> {
        self.0.iter()
    }

    /// Display names, in order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.name().to_string()).collect()
    }
}

impl From<Vec<CredentialRef>> for CandidateSet {
    fn from(refs: Vec<CredentialRef>) -> Self {
        Self(refs)
    }
}

impl FromIterator<CredentialRef> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = CredentialRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_leading_slash() {
        let id = CredentialRef::parse("/web/bank").unwrap();
        assert_eq!(id.as_str(), "web/bank");
        assert_eq!(id.name(), "bank");
    }

    #[test]
    fn test_parse_rejects_escapes() {
        for bad in ["", "/", "../etc/passwd", "web/../../x", "web//bank", "./bank"] {
            assert!(
                matches!(CredentialRef::parse(bad), Err(RepositoryError::InvalidIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_candidate_names() {
        let set: CandidateSet = ["bank", "web/mail"]
            .iter()
            .map(|s| CredentialRef::parse(s).unwrap())
            .collect();
        assert_eq!(set.names(), vec!["bank", "mail"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().as_str(), "web/mail");
    }
}
