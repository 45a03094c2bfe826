//! The autofill engine: one serialized entry point per host callback.

use std::sync::Arc;

use passfill_context::{
    app_info, is_browser, ContextError, ForegroundTarget, NotificationKind, OriginDetector,
    UiNotification, WebPage, WindowId,
};
use passfill_crypto::{Clock, CryptoService, DecryptedCredential};
use passfill_events::EventBusRef;
use passfill_input::{ClipboardRef, FieldHandle};
use passfill_repository::CredentialRef;
use passfill_storage::PreferenceRepository;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::{Classification, EventClassifier, PromptView};
use crate::crypto::{CryptoOrchestrator, FillOutcome};
use crate::dialog::{DialogStateMachine, PromptChoice, PromptState};
use crate::host::Host;
use crate::matching::{LazyStore, MatchResolver};
use crate::preferences::PreferenceResolver;

/// The focused password field a match cycle works for.
#[derive(Debug, Clone)]
pub struct FieldContext<F> {
    pub field: F,
    pub package: Option<String>,
    pub window: Option<WindowId>,
}

impl<F> FieldContext<F> {
    fn owner(&self) -> FieldOwner {
        FieldOwner {
            package: self.package.clone(),
            window: self.window,
        }
    }
}

/// App and window a captured field belongs to. An operation that waits on
/// an external flow only completes into a field with the same owner.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldOwner {
    package: Option<String>,
    window: Option<WindowId>,
}

/// Collaborators handed to [`AutofillEngine::new`].
pub struct EngineParts<H> {
    pub host: Arc<H>,
    pub preferences: Arc<dyn PreferenceRepository>,
    pub store: LazyStore,
    pub crypto: Arc<dyn CryptoService>,
    pub clipboard: ClipboardRef,
    pub bus: EventBusRef,
    pub clock: Arc<dyn Clock>,
}

/// Drives the whole match-and-decrypt flow.
///
/// All methods take `&mut self`: the host calls them one at a time from a
/// single logical thread, and the async ones are awaited before the next
/// notification is delivered.
pub struct AutofillEngine<H: Host> {
    host: Arc<H>,
    detector: OriginDetector,
    classifier: EventClassifier,
    matcher: MatchResolver,
    dialog: DialogStateMachine<H::Field>,
    crypto: CryptoOrchestrator,
    web_page: Option<WebPage>,
    field: Option<FieldContext<H::Field>>,
    awaiting_pick: Option<FieldOwner>,
    awaiting_interaction: Option<FieldOwner>,
}

impl<H: Host> AutofillEngine<H> {
    pub fn new(parts: EngineParts<H>) -> Self {
        let preferences = PreferenceResolver::new(parts.preferences);
        Self {
            host: parts.host,
            detector: OriginDetector::new(),
            classifier: EventClassifier::new(),
            matcher: MatchResolver::new(preferences, parts.store),
            dialog: DialogStateMachine::new(Arc::clone(&parts.bus)),
            crypto: CryptoOrchestrator::new(parts.crypto, parts.clipboard, parts.clock, parts.bus),
            web_page: None,
            field: None,
            awaiting_pick: None,
            awaiting_interaction: None,
        }
    }

    pub fn with_detector(mut self, detector: OriginDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn prompt(&self) -> &PromptState<H::Field> {
        self.dialog.state()
    }

    pub fn field_context(&self) -> Option<&FieldContext<H::Field>> {
        self.field.as_ref()
    }

    /// Last web page seen in the foreground, if any.
    pub fn web_page(&self) -> Option<&WebPage> {
        self.web_page.as_ref()
    }

    pub fn cached_credential(&self) -> Option<Arc<DecryptedCredential>> {
        self.crypto.cached_credential()
    }

    /// Credential waiting on an interactive step.
    pub fn pending_interaction(&self) -> Option<&CredentialRef> {
        self.crypto.pending()
    }

    /// Handle one UI notification.
    pub fn on_notification(&mut self, notification: UiNotification<H::Field>) {
        if self.crypto.expire_cache() && self.dialog.dismiss_username_prompt() {
            debug!("username expired, closed its prompt");
        }

        if let Err(e) = self.refresh_web_page(&notification) {
            debug!(error = %e, "skipping notification");
            return;
        }

        let view = PromptView {
            has_cached_username: self.crypto.cached_credential().is_some(),
            select_prompt_live: self.dialog.has_select_prompt(),
        };

        match self.classifier.classify(&notification, view, self.host.as_ref()) {
            Classification::Ignore => {}
            Classification::DismissStalePrompt => {
                let visible = self.host.visible_windows();
                self.dialog.dismiss_if_window_gone(
                    visible.as_deref(),
                    notification.kind,
                    notification.emitter(),
                );
            }
            Classification::DismissPrompt => {
                self.dialog.dismiss();
            }
            Classification::OfferUsernamePaste => self.offer_username(notification),
            Classification::BeginMatchCycle => self.begin_match_cycle(notification),
        }
    }

    /// The user picked item `index` of the selection prompt.
    pub async fn on_prompt_choice(&mut self, index: usize) {
        match self.dialog.choose(index) {
            Some(PromptChoice::Decrypt(credential)) => {
                self.decrypt_into_field(credential, None).await;
            }
            Some(choice) => {
                debug!(?choice, "external picker requested");
                self.awaiting_pick = self.field.as_ref().map(FieldContext::owner);
            }
            None => {}
        }
    }

    /// The user asked for the match settings of the prompt's identity.
    pub fn on_open_settings(&mut self) {
        self.dialog.open_settings();
    }

    pub fn on_cancel_prompt(&mut self) {
        self.dialog.dismiss();
    }

    /// The user confirmed pasting the cached username.
    pub fn on_paste_username(&mut self) {
        let Some(field) = self.dialog.take_username_paste() else {
            return;
        };
        self.crypto.expire_cache();
        let Some(credential) = self.crypto.cached_credential() else {
            debug!("username expired before paste");
            return;
        };
        let settings = self.matcher.preferences().settings();
        if let Some(result) = self.crypto.paste_username(&field, &credential, &settings) {
            if result.reclaimed_focus {
                self.classifier.suppress_next_focus();
            }
        }
    }

    /// The external picker returned a store path.
    ///
    /// Ignored unless the picker was launched from a prompt and the captured
    /// field still belongs to the same app and window.
    pub async fn on_picked(&mut self, store_path: &str) {
        let Some(owner) = self.awaiting_pick.take() else {
            warn!("picker result without a launched picker");
            return;
        };
        if !self.field_owned_by(&owner) {
            warn!("captured field changed since the picker opened, dropping pick");
            return;
        }
        match CredentialRef::parse(store_path) {
            Ok(credential) => self.decrypt_into_field(credential, None).await,
            Err(e) => warn!(error = %e, "picker returned an unusable path"),
        }
    }

    /// The external interactive step finished; retry the pending decrypt.
    pub async fn on_interaction_result(&mut self, resume_data: Value) {
        let owner = self.awaiting_interaction.take();
        let Some(credential) = self.crypto.take_pending() else {
            warn!("interaction result without a pending decrypt");
            return;
        };
        if !owner.is_some_and(|owner| self.field_owned_by(&owner)) {
            warn!(
                credential = %credential,
                "captured field changed since the interaction began, dropping it"
            );
            return;
        }
        self.decrypt_into_field(credential, Some(resume_data)).await;
    }

    fn refresh_web_page(
        &mut self,
        notification: &UiNotification<H::Field>,
    ) -> Result<(), ContextError> {
        let window_changed = notification.kind == NotificationKind::WindowStateChanged;
        let page_changed = notification.kind == NotificationKind::WindowContentChanged
            && is_browser(notification.emitter());
        if !window_changed && !page_changed {
            return Ok(());
        }

        let root = self
            .host
            .active_root()
            .ok_or(ContextError::WindowUnavailable)?;
        self.web_page = self.detector.detect(&root);
        Ok(())
    }

    fn offer_username(&mut self, notification: UiNotification<H::Field>) {
        let (Some(field), Some(credential)) = (notification.source, self.crypto.cached_credential())
        else {
            return;
        };
        let Some(username) = credential.username() else {
            return;
        };
        let window = field.window_id();
        self.dialog.open_username(field, window, username);
    }

    fn begin_match_cycle(&mut self, notification: UiNotification<H::Field>) {
        self.dialog.dismiss();
        let Some(field) = notification.source else {
            return;
        };

        let settings = self.matcher.preferences().settings();
        let window = field.window_id();
        let package = field.package_name();
        let context = FieldContext {
            field,
            package: package.clone(),
            window,
        };
        self.drop_waits_not_owned_by(&context.owner());
        self.field = Some(context);

        let host = Arc::clone(&self.host);
        let target = ForegroundTarget::choose(self.web_page.as_ref(), || {
            package.map(|p| app_info(host.as_ref(), &p))
        });
        let Some(target) = target else {
            debug!("field has no owning package, ending cycle");
            return;
        };

        let context = self.matcher.resolve(&target, &settings);
        if context.candidates.is_empty() && !settings.default_always_match {
            debug!(identity = %context.identity, "no candidates, no prompt");
            return;
        }
        self.dialog.open_select(context, window);
    }

    fn field_owned_by(&self, owner: &FieldOwner) -> bool {
        self.field.as_ref().is_some_and(|ctx| ctx.owner() == *owner)
    }

    /// A new cycle for another field abandons whatever the old one waited on.
    fn drop_waits_not_owned_by(&mut self, owner: &FieldOwner) {
        if self.awaiting_pick.as_ref().is_some_and(|o| o != owner) {
            debug!("dropping picker result of the previous field");
            self.awaiting_pick = None;
        }
        if self.awaiting_interaction.as_ref().is_some_and(|o| o != owner) {
            self.awaiting_interaction = None;
            if let Some(stale) = self.crypto.take_pending() {
                debug!(credential = %stale, "dropping interaction of the previous field");
            }
        }
    }

    async fn decrypt_into_field(&mut self, credential: CredentialRef, resume: Option<Value>) {
        let Some((field, owner)) = self
            .field
            .as_ref()
            .map(|ctx| (ctx.field.clone(), ctx.owner()))
        else {
            warn!(credential = %credential, "no captured field to fill");
            return;
        };

        let store = match self.matcher.store() {
            Ok(store) => store,
            Err(e) => {
                self.crypto.report_failure(&e.into());
                return;
            }
        };
        let settings = self.matcher.preferences().settings();

        let outcome = self
            .crypto
            .fill(store.as_ref(), &credential, &field, resume, &settings)
            .await;
        self.awaiting_interaction = None;
        match outcome {
            FillOutcome::Filled(result) if result.reclaimed_focus => {
                self.classifier.suppress_next_focus();
            }
            FillOutcome::AwaitingInteraction => self.awaiting_interaction = Some(owner),
            _ => {}
        }
    }
}
