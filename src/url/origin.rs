use crate::UrlError;
use url::Url;

/// Validates a user-supplied start URL
///
/// Only absolute HTTP(S) URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use scrapemark::url::validate_start_url;
///
/// assert!(validate_start_url("https://example.com/docs").is_ok());
/// assert!(validate_start_url("ftp://example.com").is_err());
/// ```
pub fn validate_start_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}

/// Returns the serialized origin (`scheme://host[:port]`) of a URL
///
/// This is the prefix that discovered links must start with to stay inside
/// a crawl.
pub fn extract_origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Returns true when `candidate` lies under `origin`
///
/// The check is prefix based but respects the host boundary, so
/// `https://a.com.evil.net` is not considered part of `https://a.com`.
pub fn is_same_origin(candidate: &str, origin: &str) -> bool {
    match candidate.strip_prefix(origin) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}
