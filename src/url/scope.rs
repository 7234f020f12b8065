use crate::UrlError;
use url::Url;

/// Extracts the lowercase host from a URL
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// True iff `host` equals `root` or is a subdomain of it
fn host_matches(host: &str, root: &str) -> bool {
    if root.is_empty() {
        return false;
    }
    host == root
        || (host.len() > root.len()
            && host.ends_with(root)
            && host.as_bytes()[host.len() - root.len() - 1] == b'.')
}

/// Checks whether `candidate` belongs to the site rooted at `seed`
///
/// The candidate is in scope when its host equals the seed's host or is a
/// subdomain of it. Ports and schemes are ignored. Unparsable input is
/// never in scope.
///
/// # Examples
///
/// ```
/// use insight_miner::url::in_scope;
///
/// assert!(in_scope("https://example.com/", "https://docs.example.com/a"));
/// assert!(!in_scope("https://example.com/", "https://notexample.com/"));
/// ```
pub fn in_scope(seed: &str, candidate: &str) -> bool {
    let (Ok(seed), Ok(candidate)) = (Url::parse(seed), Url::parse(candidate)) else {
        return false;
    };
    match (extract_host(&seed), extract_host(&candidate)) {
        (Some(root), Some(host)) => host_matches(&host, &root),
        _ => false,
    }
}

/// Crawl scope: the seed host plus any explicitly configured extra hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    root: String,
    extra_hosts: Vec<String>,
}

impl Scope {
    /// Builds a scope from the seed URL and extra hostnames
    pub fn new(seed: &str, extra_hosts: &[String]) -> Result<Self, UrlError> {
        let seed = Url::parse(seed).map_err(|e| UrlError::Parse(e.to_string()))?;
        let root = extract_host(&seed).ok_or(UrlError::MissingDomain)?;

        let extra_hosts = extra_hosts
            .iter()
            .map(|h| h.trim().trim_matches('.').to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        Ok(Self { root, extra_hosts })
    }

    /// The seed host
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Checks whether a parsed URL is inside the crawl scope
    pub fn contains(&self, url: &Url) -> bool {
        match extract_host(url) {
            Some(host) => self.contains_host(&host),
            None => false,
        }
    }

    /// Checks whether a URL string is inside the crawl scope
    pub fn contains_str(&self, url: &str) -> bool {
        Url::parse(url).map(|u| self.contains(&u)).unwrap_or(false)
    }

    fn contains_host(&self, host: &str) -> bool {
        host_matches(host, &self.root) || self.extra_hosts.iter().any(|h| host_matches(host, h))
    }
}
