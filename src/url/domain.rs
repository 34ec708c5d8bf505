use crate::url::normalize::canonicalize;
use crate::UrlError;
use url::Url;

/// Removes a leading `www.` label from a host
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Extracts the host from a URL in the form used for domain comparisons
///
/// The host is lowercased and a leading `www.` is stripped. If the URL has
/// no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_sift::url::extract_host;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| strip_www(&h.to_lowercase()).to_string())
}

/// Decides whether hosts belong to the crawl's base domain
///
/// The base domain is the canonical host of the seed URL. A host is inside
/// the domain when it equals the base domain or is any subdomain of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPolicy {
    base_domain: String,
}

impl DomainPolicy {
    /// Creates a policy for an already-known base domain
    pub fn new(base_domain: &str) -> Self {
        Self {
            base_domain: strip_www(&base_domain.to_lowercase()).to_string(),
        }
    }

    /// Derives the base domain from the seed URL
    ///
    /// # Arguments
    ///
    /// * `seed` - The raw seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(DomainPolicy)` - Policy rooted at the seed's host
    /// * `Err(UrlError)` - The seed cannot be canonicalized
    pub fn from_seed(seed: &str) -> Result<Self, UrlError> {
        let url = canonicalize(seed)?;
        let host = extract_host(&url).ok_or_else(|| UrlError::MissingHost(seed.to_string()))?;
        Ok(Self::new(&host))
    }

    /// Returns the base domain this policy admits
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Returns true if the host is the base domain or one of its subdomains
    pub fn same_domain(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        let host = strip_www(&host);

        if host == self.base_domain {
            return true;
        }

        // Subdomain match requires a label boundary, so "notexample.com"
        // does not match "example.com"
        host.len() > self.base_domain.len()
            && host.ends_with(&self.base_domain)
            && host.as_bytes()[host.len() - self.base_domain.len() - 1] == b'.'
    }

    /// Applies [`DomainPolicy::same_domain`] to a URL's host
    pub fn url_in_domain(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self.same_domain(host),
            None => false,
        }
    }
}
