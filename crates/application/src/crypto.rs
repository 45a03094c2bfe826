//! Decrypt-and-verify orchestration and secret delivery.

use std::sync::Arc;
use std::time::Duration;

use passfill_crypto::{
    Clock, CryptoError, CryptoService, DecryptedCredential, SecretCache, ServiceConnection,
    ServiceResult,
};
use passfill_events::{publish, EventBusRef, ExternalFlow, FillCompleted, FlowRequested, Toast};
use passfill_input::{ClipboardRef, FieldHandle, FieldInjector, InjectOptions, InjectResult};
use passfill_repository::{CredentialRef, PasswordStore};
use passfill_storage::AutofillSettings;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::EngineError;

/// Result of one decrypt-and-verify exchange.
#[derive(Debug)]
pub enum DecryptOutcome {
    Success(Arc<DecryptedCredential>),
    /// Opaque token for the external interactive step.
    InteractionRequired(Value),
    Failure(EngineError),
}

/// What happened to the captured field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    Filled(InjectResult),
    AwaitingInteraction,
    Failed,
}

/// Runs decrypt requests against the crypto service and delivers results.
///
/// Owns the username cache and the credential waiting on an interactive
/// step.
pub struct CryptoOrchestrator {
    connection: ServiceConnection,
    injector: FieldInjector,
    clock: Arc<dyn Clock>,
    bus: EventBusRef,
    cache: SecretCache,
    pending: Option<CredentialRef>,
}

impl CryptoOrchestrator {
    pub fn new(
        service: Arc<dyn CryptoService>,
        clipboard: ClipboardRef,
        clock: Arc<dyn Clock>,
        bus: EventBusRef,
    ) -> Self {
        Self {
            connection: ServiceConnection::new(service),
            injector: FieldInjector::new(clipboard),
            clock,
            bus,
            cache: SecretCache::new(),
            pending: None,
        }
    }

    /// Cached credential with a username, if still valid.
    pub fn cached_credential(&self) -> Option<Arc<DecryptedCredential>> {
        self.cache
            .get(self.clock.now_ms())
            .filter(|c| c.username().is_some())
    }

    /// Drop the cached credential once expired.
    pub fn expire_cache(&mut self) -> bool {
        self.cache.expire_if_stale(self.clock.now_ms())
    }

    /// Credential whose decrypt is waiting on an interactive step.
    pub fn pending(&self) -> Option<&CredentialRef> {
        self.pending.as_ref()
    }

    pub fn take_pending(&mut self) -> Option<CredentialRef> {
        self.pending.take()
    }

    /// Read `credential` from the store and run it through the service.
    pub async fn decrypt_and_verify(
        &self,
        store: &dyn PasswordStore,
        credential: &CredentialRef,
        resume: Option<Value>,
    ) -> DecryptOutcome {
        let ciphertext = match store.read(credential) {
            Ok(bytes) => bytes,
            Err(e) => return DecryptOutcome::Failure(e.into()),
        };

        match self.connection.decrypt_verify(ciphertext, resume).await {
            Err(e) => DecryptOutcome::Failure(e.into()),
            Ok(ServiceResult::Success(plaintext)) => match DecryptedCredential::parse(&plaintext) {
                Ok(parsed) => DecryptOutcome::Success(Arc::new(parsed)),
                Err(e) => DecryptOutcome::Failure(e.into()),
            },
            Ok(ServiceResult::InteractionRequired(token)) => DecryptOutcome::InteractionRequired(token),
            Ok(ServiceResult::Error { code, message }) => {
                DecryptOutcome::Failure(EngineError::Service { code, message })
            }
        }
    }

    /// Decrypt `credential` and deliver its password into `field`.
    pub async fn fill<F: FieldHandle + ?Sized>(
        &mut self,
        store: &dyn PasswordStore,
        credential: &CredentialRef,
        field: &F,
        resume: Option<Value>,
        settings: &AutofillSettings,
    ) -> FillOutcome {
        self.pending = None;

        match self.decrypt_and_verify(store, credential, resume).await {
            DecryptOutcome::Success(decrypted) => {
                self.deliver(credential, decrypted, field, settings)
            }
            DecryptOutcome::InteractionRequired(token) => {
                info!(credential = %credential, "crypto service needs user interaction");
                self.pending = Some(credential.clone());
                publish(
                    self.bus.as_ref(),
                    &FlowRequested {
                        flow: ExternalFlow::Interaction { token },
                    },
                );
                FillOutcome::AwaitingInteraction
            }
            DecryptOutcome::Failure(e) => {
                self.report_failure(&e);
                FillOutcome::Failed
            }
        }
    }

    /// Paste the cached username into `field`.
    pub fn paste_username<F: FieldHandle + ?Sized>(
        &self,
        field: &F,
        credential: &DecryptedCredential,
        settings: &AutofillSettings,
    ) -> Option<InjectResult> {
        let username = credential.username()?;
        match self.injector.inject(field, username, inject_options(settings)) {
            Ok(result) => {
                debug!(used_clipboard = result.used_clipboard, "pasted username");
                Some(result)
            }
            Err(e) => {
                self.report_failure(&e.into());
                None
            }
        }
    }

    /// Log a failure and tell the user about it where it concerns them.
    pub fn report_failure(&self, failure: &EngineError) {
        match failure {
            EngineError::Service { code, message } => {
                error!(code, message = %message, "crypto service returned an error");
                self.toast(Toast::error(format!("Error from crypto service: {message}")));
            }
            EngineError::Crypto(CryptoError::SecretDecode(reason)) => {
                warn!(reason = %reason, "decrypted entry could not be read, nothing delivered");
            }
            other => {
                warn!(error = %other, "decrypt failed");
                self.toast(Toast::error(other.to_string()));
            }
        }
    }

    fn deliver<F: FieldHandle + ?Sized>(
        &mut self,
        credential: &CredentialRef,
        decrypted: Arc<DecryptedCredential>,
        field: &F,
        settings: &AutofillSettings,
    ) -> FillOutcome {
        let result = match self
            .injector
            .inject(field, decrypted.password(), inject_options(settings))
        {
            Ok(result) => result,
            Err(e) => {
                self.report_failure(&e.into());
                return FillOutcome::Failed;
            }
        };

        let username_ttl_secs = if decrypted.username().is_some() {
            let ttl = settings.username_ttl_seconds;
            self.cache
                .store(decrypted, Duration::from_secs(ttl), self.clock.now_ms());
            self.toast(Toast::info(format!(
                "Username can be pasted for the next {ttl} seconds"
            )));
            Some(ttl)
        } else {
            self.cache.clear();
            None
        };

        publish(
            self.bus.as_ref(),
            &FillCompleted {
                credential: credential.to_string(),
                used_clipboard: result.used_clipboard,
                username_ttl_secs,
            },
        );
        info!(credential = %credential, used_clipboard = result.used_clipboard, "password filled");
        FillOutcome::Filled(result)
    }

    fn toast(&self, toast: Toast) {
        publish(self.bus.as_ref(), &toast);
    }
}

fn inject_options(settings: &AutofillSettings) -> InjectOptions {
    InjectOptions {
        scrub_extra: settings.scrub_clipboard_extra,
    }
}
