//! URL handling module for Scrapemark
//!
//! This module provides URL normalization for deduplication, noise
//! classification for links and network requests, and origin helpers used to
//! keep a crawl on one site.

mod filter;
mod normalize;
mod origin;

pub use filter::{
    allow_request, is_noise, should_block_request, RequestInfo, ResourceType,
    STATIC_EXTENSIONS, STATIC_PATH_PREFIXES,
};
pub use normalize::{normalize, NormalizedUrl};
pub use origin::{extract_origin, is_same_origin, validate_start_url};

/// Normalizes a discovered href and keeps it only if it is a crawlable page
///
/// A link is crawlable when its normalized form lies under `origin` and is not
/// noise per [`is_noise`].
pub fn crawlable_link(href: &str, origin: &str) -> Option<NormalizedUrl> {
    let normalized = normalize(href);
    if is_same_origin(normalized.as_str(), origin) && !is_noise(normalized.as_str()) {
        Some(normalized)
    } else {
        None
    }
}

/// Filters a list of hrefs down to unique crawlable links, keeping DOM order
pub fn collect_crawlable_links<I, S>(hrefs: I, origin: &str) -> Vec<NormalizedUrl>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    hrefs
        .into_iter()
        .filter_map(|href| crawlable_link(href.as_ref(), origin))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawlable_link_same_origin() {
        let link = crawlable_link("https://a.com/docs/#intro", "https://a.com").unwrap();
        assert_eq!(link.as_str(), "https://a.com/docs");
    }

    #[test]
    fn test_crawlable_link_rejects_other_origin() {
        assert!(crawlable_link("https://b.com/docs", "https://a.com").is_none());
    }

    #[test]
    fn test_crawlable_link_rejects_noise() {
        assert!(crawlable_link("https://a.com/_next/static/x", "https://a.com").is_none());
        assert!(crawlable_link("https://a.com/robots.txt", "https://a.com").is_none());
    }

    #[test]
    fn test_collect_keeps_order_and_dedups() {
        let hrefs = vec![
            "https://a.com/c",
            "https://a.com/b/",
            "https://b.com/x",
            "https://a.com/c#again",
            "https://a.com/logo.png",
            "https://a.com/a",
        ];
        let links = collect_crawlable_links(hrefs, "https://a.com");
        let links: Vec<&str> = links.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://a.com/c", "https://a.com/b", "https://a.com/a"]
        );
    }
}
