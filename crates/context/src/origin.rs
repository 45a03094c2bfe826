//! Web page detection in the foreground node tree.

use url::Url;

use crate::error::ContextError;
use crate::node::UiNode;
use crate::state::WebPage;

/// Default traversal depth when searching for a web-rendering surface.
pub const DEFAULT_SEARCH_DEPTH: usize = 10;

/// Class name of the host's web-rendering surface.
pub const WEB_VIEW_CLASS: &str = "android.webkit.WebView";

/// Address bar view identifiers, in lookup order.
pub const ADDRESS_BAR_VIEW_IDS: &[&str] = &[
    "com.android.chrome:id/url_bar",
    "com.android.browser:id/url",
];

/// Finds a web page (title + origin host) in the foreground tree.
#[derive(Debug, Clone, Copy)]
pub struct OriginDetector {
    max_depth: usize,
}

impl Default for OriginDetector {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl OriginDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Inspect the tree under `root`.
    ///
    /// Returns `None` when no web-rendering surface exists within the depth
    /// bound, meaning the foreground is a native app. A found surface always
    /// yields a page; its `origin` stays `None` when no address bar text
    /// could be parsed.
    pub fn detect<N: UiNode>(&self, root: &N) -> Option<WebPage> {
        let title = find_web_view_title(root, self.max_depth)?;
        let origin = read_origin(root);

        tracing::debug!(title_len = title.len(), origin = ?origin, "web page detected");

        Some(WebPage { title, origin })
    }
}

/// Depth-bounded search over the children of `node`.
///
/// Child handles are dropped at the end of each iteration, so nodes are
/// released as soon as they have been inspected.
fn find_web_view_title<N: UiNode>(node: &N, depth: usize) -> Option<String> {
    if depth == 0 {
        return None;
    }

    for index in 0..node.child_count() {
        let Some(child) = node.child(index) else {
            continue;
        };

        if child.class_name().as_deref() == Some(WEB_VIEW_CLASS) {
            return Some(child.content_description().unwrap_or_default());
        }

        if let Some(title) = find_web_view_title(&child, depth - 1) {
            return Some(title);
        }
    }

    None
}

/// Read the address bar of the first browser implementation that has one.
/// When several nodes match, the last parseable one wins.
fn read_origin<N: UiNode>(root: &N) -> Option<String> {
    let nodes = ADDRESS_BAR_VIEW_IDS
        .iter()
        .map(|id| root.find_by_view_id(id))
        .find(|nodes| !nodes.is_empty())?;

    let mut origin = None;
    for node in &nodes {
        let Some(text) = node.text() else {
            continue;
        };
        match parse_origin_host(&text) {
            Ok(host) => origin = Some(host),
            Err(e) => tracing::debug!("ignoring address bar text: {}", e),
        }
    }
    origin
}

/// Parse address bar text into a lower-cased host.
///
/// Address bars usually hide the scheme, so text without one is retried
/// once as `http://<text>`.
pub fn parse_origin_host(text: &str) -> Result<String, ContextError> {
    let text = text.trim();

    host_of(text)
        .or_else(|| host_of(&format!("http://{text}")))
        .ok_or_else(|| ContextError::MalformedOrigin(text.to_string()))
}

fn host_of(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}
