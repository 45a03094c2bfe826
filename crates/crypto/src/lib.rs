//! Decrypt-service plumbing for passfill.
//!
//! The actual OpenPGP work happens in an external service. This crate
//! holds the pieces around it:
//!
//! ```text
//! ┌───────────────────┐   bind (single-flight)   ┌──────────────────┐
//! │ ServiceConnection │ ───────────────────────► │  CryptoService   │
//! │                   │ ◄─── ServiceResult ───── │  (external)      │
//! └─────────┬─────────┘                          └──────────────────┘
//!           │ Success(bytes)
//!           ▼
//! ┌───────────────────┐        ┌─────────────┐
//! │DecryptedCredential│ ─────► │ SecretCache │  (username, TTL)
//! └───────────────────┘        └─────────────┘
//! ```
//!
//! Decrypted material lives in `zeroize` wrappers and is scrubbed on drop.

mod cache;
mod clock;
mod credential;
mod service;

pub use cache::SecretCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::DecryptedCredential;
pub use service::{CryptoService, ScriptedCryptoService, ServiceConnection, ServiceResult};

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("failed to bind crypto service: {0}")]
    BindFailed(String),
    #[error("malformed decrypted entry: {0}")]
    SecretDecode(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
