//! Static HTML parsing for the fetch fallback
//!
//! Without a browser there is no JavaScript and no cleaned DOM, so this
//! parser pulls out what a plain HTML document offers:
//! - Page title (from `<title>`)
//! - Visible body text, whitespace-collapsed
//! - Anchor links resolved against the page URL
//! - Image sources resolved the same way

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text content never counts as page text
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from a statically fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Body text with whitespace collapsed to single spaces
    pub body_text: String,

    /// Absolute anchor URLs in document order
    pub links: Vec<String>,

    /// Absolute `<img src>` URLs in document order
    pub image_urls: Vec<String>,
}

impl StaticPage {
    /// Text handed to the chunker: title, a blank line, the body and then
    /// one image URL per line if the page has any
    pub fn content_text(&self) -> String {
        let mut text = format!(
            "{}\n\n{}",
            self.title.as_deref().unwrap_or_default(),
            self.body_text
        );

        if !self.image_urls.is_empty() {
            text.push_str("\n\n");
            text.push_str(&self.image_urls.join("\n"));
        }

        text
    }
}

/// Parses HTML content and extracts title, body text and links
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use scrapemark::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>Hi</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.body_text, "Hi Link");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> StaticPage {
    let document = Html::parse_document(html);

    StaticPage {
        title: extract_title(&document),
        body_text: extract_body_text(&document),
        links: extract_links(&document, base_url),
        image_urls: extract_image_urls(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects body text, skipping script-like elements
fn extract_body_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };

    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut words: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().filter_map(ElementRef::wrap).any(|element| {
            NON_TEXT_ELEMENTS.contains(&element.value().name())
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Extracts all valid anchor links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Extracts image sources, resolved like links
fn extract_image_urls(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(img_selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .filter_map(|element| element.value().attr("src"))
        .filter_map(|src| resolve_link(src, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
