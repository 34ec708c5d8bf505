/// File extensions that never lead to an HTML page
const NON_HTML_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "avif", "bmp", "tiff", // images
    "mp4", "avi", "mov", "mkv", "webm", // video
    "mp3", "ogg", "wav", "flac", "m4a", // audio
    "pdf", "zip", "rar", "7z", "gz", "tar", "xz", // documents and archives
    "ttf", "otf", "woff", "woff2", // fonts
    "css", "js", "map", "xml", // assets
];

/// Returns the lowercase extension of the last path segment, if any
///
/// Query and fragment are ignored. A URL ending in `/` has an empty last
/// segment and therefore no extension.
fn last_segment_extension(url: &str) -> Option<String> {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    let without_query = &url[..end];

    // Skip past the scheme and authority so "example.com" is not read as an extension
    let path = match without_query.find("://") {
        Some(idx) => {
            let after = &without_query[idx + 3..];
            match after.find('/') {
                Some(slash) => &after[slash..],
                None => "",
            }
        }
        None => without_query,
    };

    let segment = path.rsplit('/').next().unwrap_or("");
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Returns true if the URL points at a known non-HTML resource
pub fn is_non_html_resource(url: &str) -> bool {
    last_segment_extension(url)
        .map(|ext| NON_HTML_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Returns true if the URL may lead to an HTML page worth fetching
///
/// Non-HTML resources are excluded unless the URL ends in `/`.
pub fn is_crawlable_resource(url: &str) -> bool {
    url.ends_with('/') || !is_non_html_resource(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_is_non_html() {
        assert!(is_non_html_resource("https://example.com/logo.png"));
        assert!(is_non_html_resource("https://example.com/img/Photo.JPEG"));
        assert!(is_non_html_resource("https://example.com/a.svg?v=3"));
    }

    #[test]
    fn test_assets_and_archives() {
        assert!(is_non_html_resource("https://example.com/site.css"));
        assert!(is_non_html_resource("https://example.com/app.js"));
        assert!(is_non_html_resource("https://example.com/dump.tar"));
        assert!(is_non_html_resource("https://example.com/report.pdf#page=2"));
    }

    #[test]
    fn test_html_pages_pass() {
        assert!(!is_non_html_resource("https://example.com/"));
        assert!(!is_non_html_resource("https://example.com"));
        assert!(!is_non_html_resource("https://example.com/about"));
        assert!(!is_non_html_resource("https://example.com/index.html"));
        assert!(!is_non_html_resource("https://example.com/page.php?file=a.png"));
    }

    #[test]
    fn test_trailing_slash_keeps_resource() {
        assert!(!is_crawlable_resource("https://example.com/image.png"));
        assert!(is_crawlable_resource("https://example.com/image.png/"));
        assert!(is_crawlable_resource("https://example.com/docs"));
    }

    #[test]
    fn test_host_tld_is_not_an_extension() {
        assert!(!is_non_html_resource("https://example.xml"));
        assert!(!is_non_html_resource("https://cdn.js"));
    }
}
