//! Replays a scripted autofill session against in-memory collaborators.
//!
//! ```text
//! RUST_LOG=passfill=debug cargo run -p passfill-application --example replay_session
//! ```

use std::sync::Arc;
use std::time::Duration;

use passfill_application::{AutofillEngine, EngineParts, LazyStore, MemoryHost};
use passfill_context::{MemoryNode, NotificationKind, UiNotification, WindowId};
use passfill_crypto::{ManualClock, ScriptedCryptoService, ServiceResult};
use passfill_events::{EventBus, InMemoryEventBus};
use passfill_input::{MemoryClipboard, MemoryField};
use passfill_repository::{FsPasswordStore, PasswordStore};
use passfill_storage::Database;
use tracing_subscriber::EnvFilter;

const BANK: &str = "com.example.bank";

/// Prints every event and keeps a copy.
struct PrintingBus {
    inner: InMemoryEventBus,
}

impl EventBus for PrintingBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        println!("  -> {topic}: {payload}");
        self.inner.emit(topic, payload);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,passfill=debug")),
        )
        .init();

    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("web"))?;
    std::fs::write(dir.path().join("bank.gpg"), b"ciphertext")?;
    std::fs::write(dir.path().join("web/mail.gpg"), b"ciphertext")?;
    let root = dir.path().to_path_buf();
    let store = LazyStore::new(move || {
        let store: Arc<dyn PasswordStore> = Arc::new(FsPasswordStore::open(&root)?);
        Ok(store)
    });

    let host = Arc::new(MemoryHost::new().with_app_label(BANK, "Example Bank"));
    host.set_root(Some(MemoryNode::new()));
    host.set_windows(Some(vec![WindowId(1)]));

    let service = Arc::new(ScriptedCryptoService::new());
    let clock = Arc::new(ManualClock::new(0));
    let clipboard = Arc::new(MemoryClipboard::new());

    let mut engine = AutofillEngine::new(EngineParts {
        host: host.clone(),
        preferences: Arc::new(Database::open_in_memory()?),
        store,
        crypto: service.clone(),
        clipboard,
        bus: Arc::new(PrintingBus {
            inner: InMemoryEventBus::new(),
        }),
        clock: clock.clone(),
    });

    let password = MemoryField::new(BANK, WindowId(1));
    let username = MemoryField::new(BANK, WindowId(1));

    println!("1. password field focused");
    engine.on_notification(
        UiNotification::new(NotificationKind::ViewFocused, BANK)
            .with_source(password.clone())
            .password(),
    );

    println!("2. user picks \"bank\"");
    service.respond(ServiceResult::success(b"correct horse\nlogin: alice\n".to_vec()));
    engine.on_prompt_choice(0).await;
    println!("   password field now holds {} chars", password.text().map_or(0, |t| t.len()));

    println!("3. synthetic focus from the reclaim is swallowed");
    engine.on_notification(
        UiNotification::new(NotificationKind::ViewFocused, BANK)
            .with_source(password.clone())
            .password(),
    );

    println!("4. username field focused 10s later");
    clock.advance(Duration::from_secs(10));
    engine.on_notification(
        UiNotification::new(NotificationKind::ViewFocused, BANK)
            .with_source(username.clone())
            .editable(),
    );
    engine.on_paste_username();
    println!("   username field filled: {}", username.text().is_some());

    println!("5. the app window goes away");
    host.set_windows(Some(vec![WindowId(2)]));
    engine.on_notification(UiNotification::new(
        NotificationKind::WindowStateChanged,
        "com.example.launcher",
    ));

    Ok(())
}
