//! External decrypt-and-verify service and the connection to it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{CryptoError, Result};

/// Outcome of one decrypt-and-verify request.
pub enum ServiceResult {
    /// Plaintext of the entry.
    Success(Zeroizing<Vec<u8>>),
    /// An interactive step must complete first. The token is handed to the
    /// host unchanged; the resumed request carries its result.
    InteractionRequired(Value),
    Error { code: i32, message: String },
}

impl std::fmt::Debug for ServiceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(plain) => write!(f, "Success(<{} bytes>)", plain.len()),
            Self::InteractionRequired(token) => f.debug_tuple("InteractionRequired").field(token).finish(),
            Self::Error { code, message } => f
                .debug_struct("Error")
                .field("code", code)
                .field("message", message)
                .finish(),
        }
    }
}

impl ServiceResult {
    pub fn success(plaintext: impl Into<Vec<u8>>) -> Self {
        Self::Success(Zeroizing::new(plaintext.into()))
    }
}

/// The external crypto service.
#[async_trait]
pub trait CryptoService: Send + Sync {
    /// Connect to the service. Completes once the service is usable.
    async fn bind(&self) -> Result<()>;

    fn is_bound(&self) -> bool;

    /// Decrypt and verify `ciphertext`. `resume` carries the payload of a
    /// completed interactive step.
    async fn decrypt_verify(&self, ciphertext: Vec<u8>, resume: Option<Value>) -> ServiceResult;
}

/// Lazily bound handle to a [`CryptoService`].
///
/// Concurrent callers share one bind attempt; requests are only issued
/// once the service reports bound. A failed bind is retried on the next
/// request.
pub struct ServiceConnection {
    service: Arc<dyn CryptoService>,
    bind_lock: tokio::sync::Mutex<()>,
}

impl ServiceConnection {
    pub fn new(service: Arc<dyn CryptoService>) -> Self {
        Self {
            service,
            bind_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.service.is_bound()
    }

    pub async fn ensure_bound(&self) -> Result<()> {
        if self.service.is_bound() {
            return Ok(());
        }
        let _guard = self.bind_lock.lock().await;
        if self.service.is_bound() {
            return Ok(());
        }

        debug!("binding crypto service");
        self.service.bind().await?;
        info!("crypto service bound");
        Ok(())
    }

    pub async fn decrypt_verify(
        &self,
        ciphertext: Vec<u8>,
        resume: Option<Value>,
    ) -> Result<ServiceResult> {
        self.ensure_bound().await?;
        debug!(bytes = ciphertext.len(), resumed = resume.is_some(), "submitting decrypt request");
        Ok(self.service.decrypt_verify(ciphertext, resume).await)
    }
}

/// In-process service that answers from a queue of canned results.
///
/// Useful for tests and demos. An empty queue answers with an error.
#[derive(Default)]
pub struct ScriptedCryptoService {
    responses: Mutex<VecDeque<ServiceResult>>,
    requests: Mutex<Vec<(Vec<u8>, Option<Value>)>>,
    bound: AtomicBool,
    bind_calls: AtomicUsize,
    refuse_bind: AtomicBool,
}

impl ScriptedCryptoService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next answer.
    pub fn respond(&self, result: ServiceResult) {
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .push_back(result);
    }

    /// Make every bind attempt fail until reset.
    pub fn refuse_bind(&self, refuse: bool) {
        self.refuse_bind.store(refuse, Ordering::SeqCst);
    }

    /// Simulate the service going away.
    pub fn disconnect(&self) {
        self.bound.store(false, Ordering::SeqCst);
    }

    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    /// Requests received so far: ciphertext and resume payload.
    pub fn requests(&self) -> Vec<(Vec<u8>, Option<Value>)> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl CryptoService for ScriptedCryptoService {
    async fn bind(&self) -> Result<()> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.refuse_bind.load(Ordering::SeqCst) {
            return Err(CryptoError::BindFailed("service refused connection".to_string()));
        }
        self.bound.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    async fn decrypt_verify(&self, ciphertext: Vec<u8>, resume: Option<Value>) -> ServiceResult {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push((ciphertext, resume));
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| ServiceResult::Error {
                code: -1,
                message: "no scripted response".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_is_lazy() {
        let service = Arc::new(ScriptedCryptoService::new());
        let connection = ServiceConnection::new(service.clone());
        assert!(!connection.is_bound());
        assert_eq!(service.bind_calls(), 0);

        service.respond(ServiceResult::success(b"pw".to_vec()));
        let result = connection.decrypt_verify(b"cipher".to_vec(), None).await.unwrap();
        assert!(matches!(result, ServiceResult::Success(_)));
        assert_eq!(service.bind_calls(), 1);
        assert!(connection.is_bound());
    }

    #[tokio::test]
    async fn test_failed_bind_issues_no_request() {
        let service = Arc::new(ScriptedCryptoService::new());
        service.refuse_bind(true);
        let connection = ServiceConnection::new(service.clone());

        let result = connection.decrypt_verify(b"cipher".to_vec(), None).await;
        assert!(matches!(result, Err(CryptoError::BindFailed(_))));
        assert!(service.requests().is_empty());
    }
}
