//! Provider traits for host UI state.
//!
//! These traits abstract the host's accessibility subsystem,
//! allowing the domain logic to remain pure and testable.

use crate::error::ContextError;
use crate::node::{UiNode, WindowId};
use crate::state::AppInfo;

/// Provider for the foreground window tree and window enumeration.
pub trait ActiveWindowProvider {
    type Node: UiNode;

    /// Root of the active window. May be `None` at any time.
    fn active_root(&self) -> Option<Self::Node>;

    /// Currently visible windows, or `None` if the host cannot enumerate them.
    fn visible_windows(&self) -> Option<Vec<WindowId>>;
}

/// Provider for installed application metadata.
pub trait AppMetadataProvider {
    /// Human-readable label of an installed package.
    fn application_label(&self, package: &str) -> Result<String, ContextError>;
}

/// Permission to draw prompts over other applications.
pub trait OverlayPermission {
    fn can_draw_overlays(&self) -> bool;

    /// Launch the host's permission grant screen.
    fn request_overlay_permission(&self);
}

/// Resolve app info, degrading to an empty label when the lookup fails.
pub fn app_info<P: AppMetadataProvider + ?Sized>(provider: &P, package: &str) -> AppInfo {
    let label = provider.application_label(package).unwrap_or_else(|e| {
        tracing::debug!(package, "app label lookup failed: {}", e);
        String::new()
    });

    AppInfo {
        package: package.to_string(),
        label,
    }
}

/// Node type of [`NullProvider`]; it has no values.
#[derive(Debug, Clone, Copy)]
pub enum NullNode {}

impl UiNode for NullNode {
    fn child_count(&self) -> usize {
        match *self {}
    }

    fn child(&self, _index: usize) -> Option<Self> {
        match *self {}
    }

    fn class_name(&self) -> Option<String> {
        match *self {}
    }

    fn content_description(&self) -> Option<String> {
        match *self {}
    }

    fn text(&self) -> Option<String> {
        match *self {}
    }

    fn find_by_view_id(&self, _view_id: &str) -> Vec<Self> {
        match *self {}
    }
}

/// Null implementation for testing or hosts without introspection.
pub struct NullProvider;

impl ActiveWindowProvider for NullProvider {
    type Node = NullNode;

    fn active_root(&self) -> Option<NullNode> {
        None
    }

    fn visible_windows(&self) -> Option<Vec<WindowId>> {
        None
    }
}

impl AppMetadataProvider for NullProvider {
    fn application_label(&self, package: &str) -> Result<String, ContextError> {
        Err(ContextError::UnknownPackage(package.to_string()))
    }
}

impl OverlayPermission for NullProvider {
    fn can_draw_overlays(&self) -> bool {
        true
    }

    fn request_overlay_permission(&self) {}
}
