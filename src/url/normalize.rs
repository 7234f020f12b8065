use crate::UrlError;
use url::Url;

/// Query parameters removed during normalization (matched case-insensitively)
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "ref_src",
    "gclid",
    "fbclid",
];

/// Resolves `href` against `base` and normalizes the result
///
/// # Normalization Steps
///
/// 1. Resolve the reference against the base URL
/// 2. Reject non-HTTP(S) results
/// 3. Remove the fragment
/// 4. Remove tracking query parameters and blank-valued pairs, keeping the
///    order of the remaining parameters
/// 5. Lowercase scheme and host (path casing is preserved)
///
/// The function is idempotent: feeding its output back in (with any base)
/// returns the same string.
///
/// # Examples
///
/// ```
/// use insight_miner::url::normalize;
///
/// let url = normalize("https://Example.COM/docs/", "../About?utm_source=x&b=2#top").unwrap();
/// assert_eq!(url, "https://example.com/About?b=2");
/// ```
pub fn normalize(base: &str, href: &str) -> Result<String, UrlError> {
    let base = Url::parse(base.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    let joined = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(joined).map(|url| url.to_string())
}

/// Normalizes an absolute URL and strips trailing slashes from the path
///
/// A path of a single `/` is left alone. Used for the seen-set and for the
/// URLs recorded on page records.
///
/// # Examples
///
/// ```
/// use insight_miner::url::canonicalize;
///
/// assert_eq!(canonicalize("https://example.com/docs/").unwrap(), "https://example.com/docs");
/// assert_eq!(canonicalize("https://example.com/").unwrap(), "https://example.com/");
/// ```
pub fn canonicalize(url_str: &str) -> Result<String, UrlError> {
    canonical_url(url_str).map(|url| url.to_string())
}

/// Same as [`canonicalize`] but returns the parsed URL
pub fn canonical_url(url_str: &str) -> Result<Url, UrlError> {
    let parsed = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    let mut url = normalize_parsed(parsed)?;

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    Ok(url)
}

fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // The url crate already lowercases scheme and host for http(s)
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, value)| !value.is_empty() && !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str()) || key.starts_with("utm_")
}
