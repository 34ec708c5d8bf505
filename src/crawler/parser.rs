//! HTML parser for extracting links
//!
//! Every element carrying an `href` attribute is considered, in document
//! order. Results are absolute http(s) URLs, deduplicated per page.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Pulls outgoing links out of fetched page content
pub trait LinkExtractor: Send + Sync {
    /// Returns absolute URLs found in `content`, resolved against `base_url`
    fn extract(&self, content: &str, base_url: &Url) -> Vec<String>;
}

/// Link extractor backed by the `scraper` HTML parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    /// Extracts all followable links from the HTML document
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - Any element with an `href` attribute (`<a>`, `<link>`, `<area>`, ...)
    ///
    /// **Exclude:**
    /// - Empty hrefs and same-page anchors (`#...`)
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - Data URIs
    /// - Anything that is not http or https after resolution
    ///
    /// # Example
    ///
    /// ```
    /// use site_sift::crawler::{HtmlLinkExtractor, LinkExtractor};
    /// use url::Url;
    ///
    /// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
    /// let base_url = Url::parse("https://example.com/").unwrap();
    /// let links = HtmlLinkExtractor::new().extract(html, &base_url);
    /// assert_eq!(links, vec!["https://example.com/page".to_string()]);
    /// ```
    fn extract(&self, content: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(content);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        if let Ok(selector) = Selector::parse("[href]") {
            for element in document.select(&selector) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, base_url) {
                        if seen.insert(absolute_url.clone()) {
                            links.push(absolute_url);
                        }
                    }
                }
            }
        }

        links
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
