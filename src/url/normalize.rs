use std::fmt;
use url::Url;

/// A URL in canonical form, used as the frontier's dedup key
///
/// Holds scheme, host (with non-default port), path and query. The fragment
/// is always removed, as are trailing slashes on the path, so
/// `https://a.com/x`, `https://a.com/x/` and `https://a.com/x#top` all map to
/// the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the canonical string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; if parsing fails the input is returned unchanged
/// 2. Drop the fragment
/// 3. Drop trailing slashes from the path (the root path becomes empty)
/// 4. Keep the query string unless it is empty
///
/// Non-HTTP(S) URLs only lose their fragment. The function never fails and is
/// idempotent: `normalize(normalize(u).as_str()) == normalize(u)`.
///
/// # Examples
///
/// ```
/// use scrapemark::url::normalize;
///
/// assert_eq!(normalize("https://Example.com/docs/#intro").as_str(), "https://example.com/docs");
/// assert_eq!(normalize("https://example.com/").as_str(), "https://example.com");
/// ```
pub fn normalize(url_str: &str) -> NormalizedUrl {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Leaving unparseable URL {:?} as-is: {}", url_str, e);
            return NormalizedUrl(url_str.to_string());
        }
    };

    url.set_fragment(None);

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return NormalizedUrl(url.to_string());
    }

    let mut normalized = url.origin().ascii_serialization();
    normalized.push_str(url.path().trim_end_matches('/'));

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        normalized.push('?');
        normalized.push_str(query);
    }

    NormalizedUrl(normalized)
}
