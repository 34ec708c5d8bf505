use crate::UrlError;
use url::{ParseError, Url};

/// Canonicalizes a URL into the form used as the crawl deduplication key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; default the scheme to `http` when it is missing
/// 2. Lowercase scheme and host
/// 3. Remove `www.` prefix from the host
/// 4. Drop the port when it is the scheme's default (80 / 443; `Url::parse` does this)
/// 5. Empty path becomes `/`
/// 6. Remove fragment (everything after #)
/// 7. Keep the query string as given
/// 8. Remove trailing slashes (except for root /)
///
/// The function is pure and idempotent: canonicalizing a canonical URL
/// returns it unchanged.
///
/// # Arguments
///
/// * `raw` - The URL string to canonicalize
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - The input cannot be parsed or has no host
///
/// # Examples
///
/// ```
/// use site_sift::url::canonicalize;
///
/// let url = canonicalize("HTTP://WWW.Example.COM:80/Foo/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/Foo");
/// ```
pub fn canonicalize(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Malformed("empty URL".to_string()));
    }

    // Step 1: Parse, retrying with an explicit scheme for inputs like "example.com/a"
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", raw))
            .map_err(|e| UrlError::Malformed(format!("{}: {}", raw, e)))?,
        Err(e) => return Err(UrlError::Malformed(format!("{}: {}", raw, e))),
    };

    // Steps 2 & 3: Lowercase the host and remove www. prefix
    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingHost(raw.to_string())),
    };
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("{}: {}", raw, e)))?;

    // Steps 5 & 8: Normalize path
    let path = normalize_path(url.path());
    url.set_path(&path);

    // Step 6: Remove fragment
    url.set_fragment(None);

    Ok(url)
}

/// Defaults an empty path to root and drops trailing slashes
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
