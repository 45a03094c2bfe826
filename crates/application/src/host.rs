//! The host platform as seen by the engine.

use std::collections::HashMap;
use std::sync::Mutex;

use passfill_context::{
    ActiveWindowProvider, AppMetadataProvider, ContextError, MemoryNode, OverlayPermission,
    WindowId,
};
use passfill_input::{FieldHandle, MemoryField};

/// Everything the engine needs from the host's accessibility layer.
pub trait Host: ActiveWindowProvider + AppMetadataProvider + OverlayPermission {
    /// Handle to a focused input node. Clones refer to the same node.
    type Field: FieldHandle + Clone;
}

/// Scriptable host for tests and demos.
#[derive(Default)]
pub struct MemoryHost {
    inner: Mutex<MemoryHostState>,
}

#[derive(Default)]
struct MemoryHostState {
    root: Option<MemoryNode>,
    windows: Option<Vec<WindowId>>,
    labels: HashMap<String, String>,
    overlay_denied: bool,
    overlay_requests: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_label(self, package: &str, label: &str) -> Self {
        self.state()
            .labels
            .insert(package.to_string(), label.to_string());
        self
    }

    /// Replace the active window tree. `None` simulates a failed lookup.
    pub fn set_root(&self, root: Option<MemoryNode>) {
        self.state().root = root;
    }

    /// Replace the visible window list. `None` means "cannot enumerate".
    pub fn set_windows(&self, windows: Option<Vec<WindowId>>) {
        self.state().windows = windows;
    }

    pub fn set_overlay_granted(&self, granted: bool) {
        self.state().overlay_denied = !granted;
    }

    pub fn overlay_requests(&self) -> usize {
        self.state().overlay_requests
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryHostState> {
        self.inner.lock().expect("host mutex poisoned")
    }
}

impl ActiveWindowProvider for MemoryHost {
    type Node = MemoryNode;

    fn active_root(&self) -> Option<MemoryNode> {
        self.state().root.clone()
    }

    fn visible_windows(&self) -> Option<Vec<WindowId>> {
        self.state().windows.clone()
    }
}

impl AppMetadataProvider for MemoryHost {
    fn application_label(&self, package: &str) -> Result<String, ContextError> {
        self.state()
            .labels
            .get(package)
            .cloned()
            .ok_or_else(|| ContextError::UnknownPackage(package.to_string()))
    }
}

impl OverlayPermission for MemoryHost {
    fn can_draw_overlays(&self) -> bool {
        !self.state().overlay_denied
    }

    fn request_overlay_permission(&self) {
        self.state().overlay_requests += 1;
    }
}

impl Host for MemoryHost {
    type Field = MemoryField;
}
