//! Filesystem-backed password store.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::credential::{CredentialRef, EntryKind, StoreEntry};
use crate::{PasswordStore, RepositoryError, Result};

/// File extension of encrypted entries.
pub const ENTRY_EXTENSION: &str = "gpg";

/// Password store rooted at a directory.
///
/// Expects directory structure:
/// ```text
/// store/
///   .gpg-id
///   bank.gpg
///   web/
///     mail.gpg
/// ```
#[derive(Debug, Clone)]
pub struct FsPasswordStore {
    root: PathBuf,
}

impl FsPasswordStore {
    /// Open the store at `root`. Fails if the directory does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RepositoryError::NotInitialized(root));
        }
        debug!(path = %root.display(), "opened password store");
        Ok(Self { root })
    }

    fn entry_path(&self, id: &CredentialRef) -> PathBuf {
        self.root.join(format!("{}.{}", id.as_str(), ENTRY_EXTENSION))
    }

    fn folder_path(&self, folder: &str) -> Result<PathBuf> {
        if folder.is_empty() {
            return Ok(self.root.clone());
        }
        let id = CredentialRef::parse(folder)?;
        Ok(self.root.join(id.as_str()))
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn join_relative(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder.trim_end_matches('/'), name)
    }
}

fn entry_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

impl PasswordStore for FsPasswordStore {
    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn list(&self, folder: &str) -> Result<Vec<StoreEntry>> {
        let dir = self.folder_path(folder)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)?.filter_map(|e| e.ok()) {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if path.is_dir() {
                entries.push(StoreEntry {
                    path: join_relative(folder, file_name),
                    kind: EntryKind::Folder,
                    is_hidden: is_hidden(file_name),
                });
            } else if let Some(stem) = entry_stem(&path) {
                entries.push(StoreEntry {
                    path: join_relative(folder, stem),
                    kind: EntryKind::Entry,
                    is_hidden: is_hidden(file_name),
                });
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn contains(&self, id: &CredentialRef) -> bool {
        self.entry_path(id).is_file()
    }

    fn read(&self, id: &CredentialRef) -> Result<Vec<u8>> {
        let path = self.entry_path(id);
        if !path.is_file() {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_root() {
        let dir = tempdir().unwrap();
        let result = FsPasswordStore::open(dir.path().join("missing"));
        assert!(matches!(result, Err(RepositoryError::NotInitialized(_))));
    }

    #[test]
    fn test_list_marks_hidden_and_skips_foreign_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bank.gpg"), b"x").unwrap();
        std::fs::write(dir.path().join(".gpg-id"), b"key").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::create_dir(dir.path().join("web")).unwrap();

        let store = FsPasswordStore::open(dir.path()).unwrap();
        let entries = store.list("").unwrap();

        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.path.as_str(), e.kind, e.is_hidden))
            .collect();
        assert_eq!(
            summary,
            vec![
                (".git", EntryKind::Folder, true),
                ("bank", EntryKind::Entry, false),
                ("web", EntryKind::Folder, false),
            ]
        );
    }

    #[test]
    fn test_read_and_contains() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("web")).unwrap();
        std::fs::write(dir.path().join("web/mail.gpg"), b"cipher").unwrap();

        let store = FsPasswordStore::open(dir.path()).unwrap();
        let id = CredentialRef::parse("web/mail").unwrap();
        assert!(store.contains(&id));
        assert_eq!(store.read(&id).unwrap(), b"cipher");

        let missing = CredentialRef::parse("web/other").unwrap();
        assert!(!store.contains(&missing));
        assert!(matches!(store.read(&missing), Err(RepositoryError::NotFound(_))));
    }
}
