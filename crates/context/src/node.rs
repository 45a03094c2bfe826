//! Accessibility node tree abstraction.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub i64);

/// A handle to one node of the foreground accessibility tree.
///
/// Handles are scoped: a host implementation releases the underlying node
/// in `Drop`, so every handle obtained during a traversal is released on
/// every exit path, including early returns.
pub trait UiNode: Sized {
    fn child_count(&self) -> usize;

    /// Acquire the child at `index`. Returns `None` if it disappeared.
    fn child(&self, index: usize) -> Option<Self>;

    fn class_name(&self) -> Option<String>;

    /// Accessible label (content description).
    fn content_description(&self) -> Option<String>;

    fn text(&self) -> Option<String>;

    /// All descendants carrying the fully-qualified view identifier.
    fn find_by_view_id(&self, view_id: &str) -> Vec<Self>;
}

/// In-memory node tree.
///
/// Used by tests and demos in place of a live host tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryNode {
    pub class_name: Option<String>,
    pub content_description: Option<String>,
    pub text: Option<String>,
    pub view_id: Option<String>,
    pub children: Vec<MemoryNode>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.content_description = Some(description.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_view_id(mut self, view_id: &str) -> Self {
        self.view_id = Some(view_id.to_string());
        self
    }

    pub fn with_child(mut self, child: MemoryNode) -> Self {
        self.children.push(child);
        self
    }

    fn collect_by_view_id(&self, view_id: &str, out: &mut Vec<MemoryNode>) {
        for child in &self.children {
            if child.view_id.as_deref() == Some(view_id) {
                out.push(child.clone());
            }
            child.collect_by_view_id(view_id, out);
        }
    }
}

impl UiNode for MemoryNode {
    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.children.get(index).cloned()
    }

    fn class_name(&self) -> Option<String> {
        self.class_name.clone()
    }

    fn content_description(&self) -> Option<String> {
        self.content_description.clone()
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn find_by_view_id(&self, view_id: &str) -> Vec<Self> {
        let mut found = Vec::new();
        self.collect_by_view_id(view_id, &mut found);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_view_id_searches_descendants() {
        let root = MemoryNode::new()
            .with_child(MemoryNode::new().with_child(MemoryNode::new().with_view_id("a:id/x")))
            .with_child(MemoryNode::new().with_view_id("a:id/x").with_text("second"));

        let found = root.find_by_view_id("a:id/x");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].text.as_deref(), Some("second"));
        assert!(root.find_by_view_id("a:id/missing").is_empty());
    }
}
