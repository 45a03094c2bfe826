//! Foreground context structures.

use serde::{Deserialize, Serialize};

/// Information about the application owning the focused field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Package identity (e.g., "com.example.bank")
    pub package: String,

    /// Display label (e.g., "Example Bank"). Empty when the host has no metadata.
    pub label: String,
}

/// A web page found in the foreground tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPage {
    /// Accessible label of the web-rendering surface (page title).
    pub title: String,

    /// Lower-cased host parsed from the browser address bar.
    #[serde(default)]
    pub origin: Option<String>,
}

impl WebPage {
    /// A page with neither a title nor an origin gives nothing to match on.
    pub fn is_usable(&self) -> bool {
        !(self.title.is_empty() && self.origin.is_none())
    }
}

/// What the focused field belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ForegroundTarget {
    App(AppInfo),
    Web(WebPage),
}

impl ForegroundTarget {
    /// Web pages win when they carry something to match on; otherwise the
    /// field is matched against its owning app.
    pub fn choose(page: Option<&WebPage>, app: impl FnOnce() -> Option<AppInfo>) -> Option<Self> {
        match page {
            Some(page) if page.is_usable() => Some(Self::Web(page.clone())),
            _ => app().map(Self::App),
        }
    }

    pub fn is_web(&self) -> bool {
        matches!(self, Self::Web(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Option<AppInfo> {
        Some(AppInfo {
            package: "com.example.bank".to_string(),
            label: "Bank".to_string(),
        })
    }

    #[test]
    fn test_usable_page_wins() {
        let page = WebPage {
            title: "Login".to_string(),
            origin: None,
        };
        let target = ForegroundTarget::choose(Some(&page), bank).unwrap();
        assert!(target.is_web());
    }

    #[test]
    fn test_blank_page_falls_back_to_app() {
        let page = WebPage {
            title: String::new(),
            origin: None,
        };
        let target = ForegroundTarget::choose(Some(&page), bank).unwrap();
        assert!(matches!(target, ForegroundTarget::App(ref app) if app.package == "com.example.bank"));
    }

    #[test]
    fn test_untitled_page_with_origin_is_web() {
        let page = WebPage {
            title: String::new(),
            origin: Some("example.com".to_string()),
        };
        assert!(ForegroundTarget::choose(Some(&page), bank).unwrap().is_web());
    }

    #[test]
    fn test_no_page_and_no_app() {
        assert!(ForegroundTarget::choose(None, || None).is_none());
    }
}
