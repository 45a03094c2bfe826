//! Short-lived cache of the last decrypted credential.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::DecryptedCredential;

struct CachedSecret {
    credential: Arc<DecryptedCredential>,
    cached_until_ms: i64,
}

/// Holds at most one credential until an absolute expiry.
///
/// A credential is readable while `now < cached_until`; at the expiry
/// instant it already reads as absent. Expiry is checked lazily by the
/// caller, there is no timer.
#[derive(Default)]
pub struct SecretCache {
    entry: Option<CachedSecret>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache `credential` for `ttl` from `now_ms`. Returns the expiry.
    pub fn store(&mut self, credential: Arc<DecryptedCredential>, ttl: Duration, now_ms: i64) -> i64 {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let cached_until_ms = now_ms.saturating_add(ttl_ms);
        self.entry = Some(CachedSecret {
            credential,
            cached_until_ms,
        });
        debug!(cached_until_ms, "cached decrypted credential");
        cached_until_ms
    }

    pub fn get(&self, now_ms: i64) -> Option<Arc<DecryptedCredential>> {
        self.entry
            .as_ref()
            .filter(|e| now_ms < e.cached_until_ms)
            .map(|e| Arc::clone(&e.credential))
    }

    /// Drop the credential if it has expired. Returns `true` if it was dropped.
    pub fn expire_if_stale(&mut self, now_ms: i64) -> bool {
        let stale = self
            .entry
            .as_ref()
            .is_some_and(|e| now_ms >= e.cached_until_ms);
        if stale {
            self.entry = None;
            debug!("expired cached credential");
        }
        stale
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn cached_until(&self) -> Option<i64> {
        self.entry.as_ref().map(|e| e.cached_until_ms)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
