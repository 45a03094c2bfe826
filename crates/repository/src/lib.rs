//! Password store access for passfill.
//!
//! The store is a directory tree of encrypted entries (`<name>.gpg`).
//! This crate lists it, reads encrypted bytes, and searches it for
//! entries whose name appears in a target identity. It never sees
//! decrypted content.

mod credential;
mod fs;
mod index;

use std::path::PathBuf;

pub use credential::{CandidateSet, CredentialRef, EntryKind, StoreEntry};
pub use fs::{FsPasswordStore, ENTRY_EXTENSION};
pub use index::CredentialIndex;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("password store is not initialized at {0}")]
    NotInitialized(PathBuf),
    #[error("invalid store identifier: {0}")]
    InvalidIdentifier(String),
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Read access to an encrypted password store.
pub trait PasswordStore: Send + Sync {
    /// Absolute location of the store root.
    fn root(&self) -> PathBuf;

    /// Entries directly inside `folder` ("" is the root), in a stable order.
    fn list(&self, folder: &str) -> Result<Vec<StoreEntry>>;

    /// Whether an encrypted entry exists for `id`.
    fn contains(&self, id: &CredentialRef) -> bool;

    /// Encrypted bytes of the entry.
    fn read(&self, id: &CredentialRef) -> Result<Vec<u8>>;
}
