//! Noise classification for links and in-flight network requests

use url::Url;

/// File extensions of static assets that never carry page content
pub const STATIC_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf",
    ".eot", ".otf", ".map", ".txt",
];

/// Path prefixes used by frameworks and APIs for non-page resources
pub const STATIC_PATH_PREFIXES: &[&str] = &["/assets", "/_next", "/static", "/_", "/api"];

/// URL fragments identifying cookie banners and consent walls
const CONSENT_MARKERS: &[&str] = &["cookie", "consent"];

/// Resource type of a request observed by a render session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    WebSocket,
    Other,
}

impl ResourceType {
    /// Returns true for sub-resource types that are aborted during rendering
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Self::Stylesheet | Self::Font | Self::Media | Self::Other
        )
    }
}

/// Metadata of one network request, handed to the interception predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub resource_type: ResourceType,
}

impl RequestInfo {
    pub fn new(url: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            url: url.into(),
            resource_type,
        }
    }
}

/// Classifies a URL as static noise
///
/// Applies two independent rules to the URL path:
/// - the path ends with one of [`STATIC_EXTENSIONS`] (case-insensitive)
/// - the path starts with one of [`STATIC_PATH_PREFIXES`]
///
/// Query strings and fragments are ignored. Strings that are not absolute
/// URLs are checked as if they were a bare path.
///
/// # Examples
///
/// ```
/// use scrapemark::url::is_noise;
///
/// assert!(is_noise("https://example.com/_next/chunk"));
/// assert!(is_noise("https://example.com/logo.svg?v=2"));
/// assert!(!is_noise("https://example.com/blog/post"));
/// ```
pub fn is_noise(url_str: &str) -> bool {
    let path = match Url::parse(url_str) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_str
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    has_static_extension(&path) || has_static_prefix(&path)
}

fn has_static_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn has_static_prefix(path: &str) -> bool {
    STATIC_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Decides whether a render session should abort a network request
///
/// Stylesheets, fonts, media and "other" resource types are aborted, as is
/// any request whose URL mentions cookies or consent. Everything else,
/// including the document itself and its scripts, continues unmodified.
pub fn should_block_request(request: &RequestInfo) -> bool {
    if request.resource_type.is_blocked() {
        return true;
    }

    let lower = request.url.to_ascii_lowercase();
    CONSENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Interception predicate handed to render sessions: true means "continue"
pub fn allow_request(request: &RequestInfo) -> bool {
    !should_block_request(request)
}
