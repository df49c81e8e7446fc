//! Scripts evaluated inside rendered pages

/// Builds the script for one auto-scroll increment
///
/// The script scrolls by `step_px` and evaluates to `true` once the bottom of
/// the document has been reached.
pub fn scroll_step_script(step_px: u32) -> String {
    format!(
        "(() => {{ \
            window.scrollBy(0, {step}); \
            const height = document.body ? document.body.scrollHeight : 0; \
            return window.scrollY + window.innerHeight >= height; \
        }})()",
        step = step_px
    )
}

/// Extracts title, cleaned body HTML and anchor hrefs as a JSON string
///
/// The body is cloned before `script`, `nav` and `svg` elements are removed,
/// so the live document is left intact. Anchors are read from the live
/// document and resolved to absolute URLs by the browser.
pub const EXTRACT_PAGE_SCRIPT: &str = r#"(() => {
    const body = document.body
        ? document.body.cloneNode(true)
        : document.createElement('body');
    body.querySelectorAll('script, nav, svg').forEach((el) => el.remove());
    const links = Array.from(document.querySelectorAll('a[href]'))
        .map((a) => a.href)
        .filter((href) => typeof href === 'string' && href.length > 0);
    return JSON.stringify({
        title: document.title || '',
        html: body.outerHTML,
        links: links,
    });
})()"#;
